// Record schemas: which fields identify, search, and total a collection

use crate::error::{SchemaError, Violation};
use crate::money::Amount;
use crate::record::{FieldValue, Record};
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use tracing::debug;

/// Describes the shape of the records a view-model holds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Collection name, used in logs and as the preset key
    pub name: String,

    #[serde(default = "default_id_field")]
    pub id_field: String,

    /// Fields the free-text query is matched against
    #[serde(default)]
    pub searchable: Vec<String>,

    /// Fields every record must carry
    #[serde(default)]
    pub required: Vec<String>,

    /// Amount/kind fields used for income and expense totals
    #[serde(default)]
    pub ledger: Option<LedgerFields>,

    /// Only records matching this can be selected (booked seats cannot)
    #[serde(default)]
    pub selectable: Option<Selectable>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerFields {
    pub amount: String,
    pub kind: String,
    /// Kind value that marks a record as credit; everything else is debit
    #[serde(default = "default_credit")]
    pub credit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selectable {
    pub field: String,
    pub equals: String,
}

fn default_id_field() -> String {
    "id".to_string()
}

fn default_credit() -> String {
    "income".to_string()
}

/// Signed contribution of one record to the totals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerEntry {
    pub amount: Amount,
    pub credit: bool,
}

pub const PRESETS: &[&str] = &[
    "transactions",
    "restaurants",
    "jobs",
    "products",
    "weather",
    "seats",
    "posts",
];

fn fields(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

impl Schema {
    /// A schema with only an identifier and no searchable or required fields
    pub fn new(name: impl Into<String>) -> Self {
        Schema {
            name: name.into(),
            id_field: default_id_field(),
            searchable: Vec::new(),
            required: Vec::new(),
            ledger: None,
            selectable: None,
        }
    }

    pub fn searchable(mut self, names: &[&str]) -> Self {
        self.searchable = fields(names);
        self
    }

    pub fn required(mut self, names: &[&str]) -> Self {
        self.required = fields(names);
        self
    }

    pub fn ledger(mut self, amount: &str, kind: &str, credit: &str) -> Self {
        self.ledger = Some(LedgerFields {
            amount: amount.to_string(),
            kind: kind.to_string(),
            credit: credit.to_string(),
        });
        self
    }

    pub fn selectable(mut self, field: &str, equals: &str) -> Self {
        self.selectable = Some(Selectable {
            field: field.to_string(),
            equals: equals.to_string(),
        });
        self
    }

    /// Built-in schemas for the record shapes the dashboards display
    pub fn preset(name: &str) -> Option<Self> {
        let schema = match name {
            "transactions" => Schema::new("transactions")
                .searchable(&["category", "description"])
                .required(&["category", "description", "date"])
                .ledger("amount", "type", "income"),
            "restaurants" => Schema::new("restaurants")
                .searchable(&["name", "cuisine"])
                .required(&["name", "cuisine"]),
            "jobs" => Schema::new("jobs")
                .searchable(&["title", "company"])
                .required(&["title", "company", "location"]),
            "products" => Schema::new("products")
                .searchable(&["title", "category"])
                .required(&["title", "price"]),
            "weather" => Schema::new("weather").searchable(&["name"]).required(&["name"]),
            "seats" => Schema::new("seats")
                .required(&["status"])
                .selectable("status", "available"),
            "posts" => Schema::new("posts").searchable(&["user"]).required(&["user", "likes"]),
            _ => return None,
        };
        Some(schema)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let schema: Schema = serde_yaml::from_str(yaml).context("Failed to parse schema YAML")?;
        Ok(schema)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Failed to read schema file {:?}", path))?;
        let schema = Self::from_yaml_str(&content)?;
        debug!(schema = %schema.name, file = ?path, "Loaded schema");
        Ok(schema)
    }

    /// Convert one JSON row into a record
    pub fn record_from_json(&self, index: usize, row: &Value) -> Result<Record, SchemaError> {
        let object = row.as_object().ok_or_else(|| SchemaError {
            index,
            id: None,
            field: self.id_field.clone(),
            violation: Violation::NotAnObject,
        })?;

        Record::from_json(object, &self.id_field).ok_or_else(|| SchemaError {
            index,
            id: None,
            field: self.id_field.clone(),
            violation: match object.get(&self.id_field) {
                None | Some(Value::Null) => Violation::Missing,
                Some(_) => Violation::WrongType("a string or integer"),
            },
        })
    }

    /// Check a record against the schema and extract its ledger entry, if any
    pub fn validate(&self, index: usize, record: &Record) -> Result<Option<LedgerEntry>, SchemaError> {
        let fail = |field: &str, violation: Violation| SchemaError {
            index,
            id: Some(record.id().clone()),
            field: field.to_string(),
            violation,
        };

        for field in &self.required {
            if record.field(field).is_none() {
                return Err(fail(field.as_str(), Violation::Missing));
            }
        }

        let Some(ledger) = &self.ledger else {
            return Ok(None);
        };

        let amount = match record.field(&ledger.amount) {
            None => return Err(fail(ledger.amount.as_str(), Violation::Missing)),
            Some(FieldValue::Integer(n)) => Amount::from_whole(*n),
            Some(FieldValue::Number(n)) => Amount::from_f64(*n),
            Some(FieldValue::Text(s)) => s.parse(),
            Some(_) => return Err(fail(ledger.amount.as_str(), Violation::WrongType("a number"))),
        }
        .map_err(|e| fail(ledger.amount.as_str(), Violation::BadAmount(e)))?;

        let kind = match record.field(&ledger.kind) {
            None => return Err(fail(ledger.kind.as_str(), Violation::Missing)),
            Some(FieldValue::Text(s)) => s,
            Some(_) => return Err(fail(ledger.kind.as_str(), Violation::WrongType("a string"))),
        };

        Ok(Some(LedgerEntry {
            amount,
            credit: *kind == ledger.credit,
        }))
    }

    pub fn is_searchable(&self, field: &str) -> bool {
        self.searchable.iter().any(|f| f == field)
    }

    /// Whether `record` may join the selection set
    pub fn is_selectable(&self, record: &Record) -> bool {
        self.selectable
            .as_ref()
            .is_none_or(|s| record.field(&s.field).is_some_and(|v| v.to_string() == s.equals))
    }
}

/// Resolve `--schema`: a preset name, or a path to a YAML file
pub fn resolve(name_or_path: &str) -> Result<Schema> {
    if let Some(schema) = Schema::preset(name_or_path) {
        return Ok(schema);
    }
    let path = Path::new(name_or_path);
    if path.exists() {
        return Schema::from_yaml_file(path);
    }
    Err(eyre::eyre!(
        "Unknown schema '{}' (expected one of {} or a YAML file path)",
        name_or_path,
        PRESETS.join(", ")
    ))
}
