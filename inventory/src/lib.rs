//! FILENAME: inventory/src/lib.rs
//! PURPOSE: Main library entry point for the inventory data layer.
//! CONTEXT: Typed records, the data-store boundary, filtering, dashboard
//! summaries and the request workflow. Re-exports public types for the
//! pivot engine and the persistence crate.

pub mod error;
pub mod filter;
pub mod request;
pub mod schema;
pub mod store;
pub mod summary;
pub mod value;

pub use error::{RequestError, SchemaError, StoreError};
pub use filter::RecordFilter;
pub use request::{ItemRequest, RequestStatus};
pub use schema::{normalize_field_name, parse_number, DimensionField, InventoryRecord, ValueField};
pub use store::{BlobStore, DataStore, InventoryRepository, MemoryBlobStore, MemoryStore, Table};
pub use summary::InventorySummary;
pub use value::{FieldValue, MISSING_LABEL};
