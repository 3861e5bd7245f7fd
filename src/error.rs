// Typed errors for view-model mutations

use crate::money::AmountError;
use crate::record::RecordId;
use thiserror::Error;

/// Errors returned by `ListViewModel::load` and `ListViewModel::append`
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ViewModelError {
    #[error("duplicate record id '{0}'")]
    DuplicateId(RecordId),
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// A record that does not carry the fields its schema requires
#[derive(Debug, Clone, PartialEq, Error)]
#[error("record #{index}{}: field '{field}' {violation}", describe_id(.id))]
pub struct SchemaError {
    /// Position of the offending record in the batch being loaded
    pub index: usize,
    pub id: Option<RecordId>,
    pub field: String,
    pub violation: Violation,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Violation {
    #[error("is missing")]
    Missing,
    #[error("must be {0}")]
    WrongType(&'static str),
    #[error("has an invalid amount: {0}")]
    BadAmount(#[from] AmountError),
    #[error("is not a JSON object")]
    NotAnObject,
}

fn describe_id(id: &Option<RecordId>) -> String {
    match id {
        Some(id) => format!(" (id '{}')", id),
        None => String::new(),
    }
}
