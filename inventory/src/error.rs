//! FILENAME: inventory/src/error.rs

use thiserror::Error;

use crate::request::RequestStatus;
use crate::store::Table;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("Record payload is not an object")]
    NotAnObject,

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid value for field {field}: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("Unknown field name: {0}")]
    UnknownField(String),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("No row with id {id} in table {table}")]
    NotFound { table: Table, id: String },

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Blob not found: {0}")]
    BlobNotFound(String),

    #[error("Invalid blob path: {0:?}")]
    InvalidPath(String),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RequestError {
    #[error("Cannot move request from {from} to {to}")]
    InvalidTransition { from: RequestStatus, to: RequestStatus },

    #[error("Requested quantity must be positive, got {0}")]
    InvalidQuantity(f64),

    #[error("Insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: f64, available: f64 },

    #[error("Request is for item {expected}, not {actual}")]
    ItemMismatch { expected: String, actual: String },
}
