// Query, category, and field predicates over records

use crate::record::Record;
use std::fmt;

/// Literal a category picker uses for "no constraint"
pub const ALL: &str = "All";

/// Free-text query, matched case-insensitively against searchable fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    text: String,
    lowered: String,
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let lowered = text.to_lowercase();
        Query { text, lowered }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Empty query matches everything; otherwise any searchable field must contain it
    pub fn matches(&self, record: &Record, searchable: &[String]) -> bool {
        if self.is_empty() {
            return true;
        }
        searchable
            .iter()
            .filter_map(|field| record.field(field))
            .any(|value| value.contains_ci(&self.lowered))
    }
}

/// Optional exact-match constraint on one categorical field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    pub fn is_all(&self) -> bool {
        matches!(self, CategoryFilter::All)
    }
}

impl From<&str> for CategoryFilter {
    fn from(value: &str) -> Self {
        if value == ALL {
            CategoryFilter::All
        } else {
            CategoryFilter::Only(value.to_string())
        }
    }
}

impl From<String> for CategoryFilter {
    fn from(value: String) -> Self {
        if value == ALL {
            CategoryFilter::All
        } else {
            CategoryFilter::Only(value)
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => write!(f, "{}", ALL),
            CategoryFilter::Only(value) => write!(f, "{}", value),
        }
    }
}

/// Predicate on a single named field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    /// Field name to filter on
    pub field: String,
    /// Comparison operator
    pub op: FilterOp,
    /// Value to compare against
    pub value: String,
}

/// Comparison operators for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,       // exact, case-sensitive
    Contains, // case-insensitive substring
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Filter {
            field: field.into(),
            op: FilterOp::Eq,
            value: value.into(),
        }
    }

    pub fn contains(field: impl Into<String>, value: impl Into<String>) -> Self {
        Filter {
            field: field.into(),
            op: FilterOp::Contains,
            value: value.into(),
        }
    }

    /// A record lacking the field never matches
    pub fn matches(&self, record: &Record) -> bool {
        let Some(actual) = record.field(&self.field) else {
            return false;
        };
        match self.op {
            FilterOp::Eq => match actual.as_text() {
                Some(text) => text == self.value,
                None => actual.to_string() == self.value,
            },
            FilterOp::Contains => actual.contains_ci(&self.value.to_lowercase()),
        }
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterOp::Eq => write!(f, "="),
            FilterOp::Contains => write!(f, "~"),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.field, self.op, self.value)
    }
}
