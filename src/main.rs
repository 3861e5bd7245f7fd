use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use eyre::{Result, eyre};
use listview::config::{default_store_path, parse_pair};
use listview::{Cart, FileLoader, KvStore, ListViewModel, Record, RecordId, load_into, schema};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "listview")]
#[command(about = "Search, filter, and total JSON record lists; manage a persistent cart")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Path to the store directory (default: platform data directory)
    #[arg(short, long)]
    store_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct DataArgs {
    /// JSON array or JSONL file holding the records
    #[arg(short, long)]
    data: PathBuf,

    /// Schema preset (transactions, restaurants, jobs, products, weather) or YAML file
    #[arg(short = 'S', long, default_value = "transactions")]
    schema: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the filtered view
    List {
        #[command(flatten)]
        data: DataArgs,

        /// Case-insensitive text matched against searchable fields
        #[arg(short, long, default_value = "")]
        query: String,

        /// Exact category constraint, FIELD=VALUE ("All" clears it)
        #[arg(short, long)]
        category: Option<String>,

        /// Case-insensitive substring constraint, FIELD=TEXT (repeatable)
        #[arg(short = 'w', long = "where")]
        filters: Vec<String>,

        /// Mark records as selected (repeatable)
        #[arg(long)]
        select: Vec<String>,

        /// Only show selected records
        #[arg(long)]
        selected_only: bool,
    },

    /// Show income, expense, and balance over all records
    Totals {
        #[command(flatten)]
        data: DataArgs,
    },

    /// List "All" plus the distinct values of a field
    Categories {
        #[command(flatten)]
        data: DataArgs,

        field: String,
    },

    /// Find the record whose field equals TEXT, ignoring case
    Lookup {
        #[command(flatten)]
        data: DataArgs,

        field: String,
        text: String,
    },

    /// Manage the persistent cart
    Cart {
        #[command(subcommand)]
        command: CartCommands,
    },
}

#[derive(Subcommand)]
enum CartCommands {
    /// Add a record from the data file to the cart
    Add {
        #[command(flatten)]
        data: DataArgs,

        id: String,

        #[arg(short = 'n', long, default_value_t = 1)]
        quantity: u32,
    },

    /// Print cart lines and their total
    Show {
        /// Field holding each line's unit price
        #[arg(long, default_value = "price")]
        price_field: String,
    },

    /// Remove every line
    Clear,
}

fn open_view_model(args: &DataArgs) -> Result<ListViewModel> {
    let schema = schema::resolve(&args.schema)?;
    let mut view_model = ListViewModel::new(schema);
    load_into(&FileLoader::new(&args.data), &mut view_model)?;
    Ok(view_model)
}

fn format_record(record: &Record, selected: bool) -> String {
    let marker = if selected { "*".yellow().bold() } else { " ".normal() };
    let fields: Vec<String> = record
        .fields()
        .map(|(name, value)| format!("{}={}", name.dimmed(), value))
        .collect();
    format!("{} {} {}", marker, record.id().to_string().cyan(), fields.join(" "))
}

fn main() -> Result<()> {
    // Setup tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let store_path = cli.store_path.unwrap_or_else(default_store_path);

    match cli.command {
        Commands::List {
            data,
            query,
            category,
            filters,
            select,
            selected_only,
        } => {
            let mut vm = open_view_model(&data)?;
            vm.set_query(&query);
            if let Some(category) = category {
                let (field, value) = parse_pair(&category)?;
                vm.set_category_filter(&field, value);
            }
            for filter in &filters {
                let (field, text) = parse_pair(filter)?;
                vm.set_field_filter(&field, &text);
            }
            for id in &select {
                vm.toggle_selected(&RecordId::from(id.as_str()));
            }

            let rows = if selected_only { vm.selected() } else { vm.filtered_view() };
            for record in &rows {
                println!("{}", format_record(record, vm.is_selected(record.id())));
            }
            println!(
                "{}",
                format!("{} of {} records, {} selected", rows.len(), vm.len(), vm.selection_len()).dimmed()
            );
        }
        Commands::Totals { data } => {
            let vm = open_view_model(&data)?;
            if vm.schema().ledger.is_none() {
                return Err(eyre!("Schema '{}' has no ledger fields", vm.schema().name));
            }
            let totals = vm.aggregate();
            println!("{:<8} {}", "Income", totals.income.to_string().green());
            println!("{:<8} {}", "Expense", totals.expense.to_string().red());
            let balance = if totals.balance.is_negative() {
                totals.balance.to_string().red().bold()
            } else {
                totals.balance.to_string().bold()
            };
            println!("{:<8} {}", "Balance", balance);
        }
        Commands::Categories { data, field } => {
            let vm = open_view_model(&data)?;
            for value in vm.categories(&field) {
                println!("{}", value);
            }
        }
        Commands::Lookup { data, field, text } => {
            let vm = open_view_model(&data)?;
            match vm.lookup(&field, &text) {
                Some(record) => println!("{}", format_record(record, false)),
                None => return Err(eyre!("No record with {} = '{}'", field, text.trim())),
            }
        }
        Commands::Cart { command } => {
            let cart = Cart::new(KvStore::open(&store_path)?);
            match command {
                CartCommands::Add { data, id, quantity } => {
                    let vm = open_view_model(&data)?;
                    let id = RecordId::from(id);
                    let record = vm.get(&id).ok_or_else(|| eyre!("No record with id '{}'", id))?;
                    let count = cart.add(record, quantity)?;
                    println!("{} added to cart ({} items)", id.to_string().cyan(), count);
                }
                CartCommands::Show { price_field } => {
                    let items = cart.items()?;
                    for line in &items {
                        let label = line
                            .fields
                            .get("title")
                            .or_else(|| line.fields.get("name"))
                            .and_then(|v| v.as_str())
                            .unwrap_or("");
                        println!(
                            "{} x{} {} {}",
                            line.id().map_or_else(|| "?".to_string(), |id| id.to_string()).cyan(),
                            line.quantity,
                            label,
                            line.added_at.dimmed()
                        );
                    }
                    match cart.total(&price_field) {
                        Ok(total) => println!("{} items, total {}", items.len(), total.to_string().bold()),
                        Err(e) => println!("{} items ({})", items.len(), format!("{:#}", e).dimmed()),
                    }
                }
                CartCommands::Clear => {
                    cart.clear()?;
                    println!("Cart cleared");
                }
            }
        }
    }

    Ok(())
}
