use listview::{Amount, Cart, FileLoader, KvStore, ListViewModel, RecordId, Schema, load_into, schema};
use std::path::PathBuf;
use tempfile::TempDir;

fn data_file(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data").join(name)
}

fn open(file: &str, schema: &str) -> ListViewModel {
    let mut vm = ListViewModel::new(schema::resolve(schema).unwrap());
    load_into(&FileLoader::new(data_file(file)), &mut vm).unwrap();
    vm
}

fn ids(vm: &ListViewModel) -> Vec<String> {
    vm.filtered_view().iter().map(|r| r.id().to_string()).collect()
}

#[test]
fn expense_dashboard_totals_and_search() {
    let mut vm = open("transactions.json", "transactions");

    let totals = vm.aggregate();
    assert_eq!(totals.income, Amount::from_cents(350_000));
    assert_eq!(totals.expense, Amount::from_cents(62_500));
    assert_eq!(totals.balance, Amount::from_cents(287_500));

    vm.set_query("rent");
    assert_eq!(ids(&vm), vec!["5"]);
    assert_eq!(vm.aggregate(), totals);

    vm.set_query("");
    assert_eq!(vm.filtered_len(), 6);
}

#[test]
fn custom_yaml_schema_searches_extra_fields() {
    let mut vm = open("transactions.json", data_file("expenses.yaml").to_str().unwrap());
    vm.set_query("paypal");
    assert_eq!(ids(&vm), vec!["4"]);

    let mut preset = open("transactions.json", "transactions");
    preset.set_query("paypal");
    assert!(preset.filtered_view().is_empty());
}

#[test]
fn food_delivery_cuisine_picker() {
    let mut vm = open("restaurants.json", "restaurants");

    assert_eq!(vm.categories("cuisine"), vec!["All", "Italian", "Japanese", "Chinese"]);

    vm.set_category_filter("cuisine", "Italian");
    assert_eq!(ids(&vm), vec!["r1", "r3"]);

    vm.set_category_filter("cuisine", "All");
    assert_eq!(ids(&vm), vec!["r1", "r2", "r3", "r4"]);
}

#[test]
fn job_finder_search_location_and_saved() {
    let mut vm = open("jobs.jsonl", "jobs");

    vm.set_query("engineer");
    assert_eq!(ids(&vm), vec!["2"]);

    vm.set_query("");
    vm.set_field_filter("location", "ma");
    assert_eq!(ids(&vm), vec!["3"]);

    assert!(vm.toggle_selected(&RecordId::from("1")));
    assert!(vm.toggle_selected(&RecordId::from("3")));
    assert!(!vm.toggle_selected(&RecordId::from("99")));
    assert_eq!(ids(&vm), vec!["3"]);

    let saved: Vec<&str> = vm.selected().iter().map(|r| r.id().as_str()).collect();
    assert_eq!(saved, vec!["1", "3"]);
}

#[test]
fn shop_cart_persists_across_opens() {
    let temp = TempDir::new().unwrap();
    let vm = open("products.json", "products");

    {
        let cart = Cart::new(KvStore::open(temp.path()).unwrap());
        cart.add(vm.get(&RecordId::from("1")).unwrap(), 1).unwrap();
        cart.add(vm.get(&RecordId::from("2")).unwrap(), 2).unwrap();
    }

    let cart = Cart::new(KvStore::open(temp.path()).unwrap());
    assert_eq!(cart.count().unwrap(), 2);
    assert_eq!(cart.total("price").unwrap(), Amount::from_cents(10_995 + 4_460));

    let items = cart.items().unwrap();
    assert_eq!(items[0].id(), Some(RecordId::from(1)));
    assert_eq!(items[1].quantity, 2);
}

#[test]
fn appended_expense_shows_up_at_the_end() {
    let mut vm = ListViewModel::new(Schema::preset("transactions").unwrap());
    load_into(&FileLoader::new(data_file("transactions.json")), &mut vm).unwrap();
    vm.set_query("e");
    let before = ids(&vm);

    let row = serde_json::json!({
        "id": 7, "amount": -12.5, "category": "Coffee", "date": "2025-03-08",
        "type": "expense", "description": "Espresso"
    });
    let record = vm.schema().record_from_json(vm.len(), &row).unwrap();
    vm.append(record).unwrap();

    let after = ids(&vm);
    assert_eq!(after.len(), before.len() + 1);
    assert_eq!(after.last().map(String::as_str), Some("7"));
    assert_eq!(vm.aggregate().expense, Amount::from_cents(63_750));
}

#[test]
fn ticket_booking_skips_booked_seats() {
    let mut vm = open("seats.json", "seats");

    for id in ["1", "3", "4", "6"] {
        vm.toggle_selected(&RecordId::from(id));
    }
    let chosen: Vec<&str> = vm.selected().iter().map(|r| r.id().as_str()).collect();
    assert_eq!(chosen, vec!["1", "4"]);
    assert_eq!(vm.selection_len(), 2);
}

#[test]
fn social_feed_like_counts() {
    let mut vm = open("posts.json", "posts");
    let post = RecordId::from("2");

    assert!(vm.toggle_selected(&post));
    assert_eq!(vm.count_with_selection(&post, "likes"), Some(26));
    assert_eq!(vm.count_with_selection(&RecordId::from("1"), "likes"), Some(10));

    vm.set_query("john");
    assert_eq!(ids(&vm), vec!["1"]);
    assert!(vm.is_selected(&post));
}
