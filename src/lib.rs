// listview - Filtered, aggregated list view-models with a JSON key-value cart store

pub mod aggregate;
pub mod cart;
pub mod config;
pub mod error;
pub mod filter;
pub mod jsonl;
pub mod loader;
pub mod money;
pub mod record;
pub mod schema;
pub mod selection;
pub mod store;
pub mod view_model;

// Re-export main types for convenience
pub use aggregate::Totals;
pub use cart::{Cart, CartLine};
pub use error::{SchemaError, ViewModelError, Violation};
pub use filter::{CategoryFilter, Filter, FilterOp, Query};
pub use loader::{FileLoader, Loader, StaticLoader, load_into};
pub use money::{Amount, AmountError};
pub use record::{FieldValue, Record, RecordId};
pub use schema::Schema;
pub use selection::SelectionSet;
pub use store::KvStore;
pub use view_model::ListViewModel;
