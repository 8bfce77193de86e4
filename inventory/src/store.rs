//! FILENAME: inventory/src/store.rs
//! Interfaces to the backend-as-a-service collaborators.
//!
//! - `DataStore`: row-oriented table access (select, filter-by-equality,
//!   insert, update, delete, count). Rows are loosely typed JSON objects.
//! - `BlobStore`: attachment storage returning public and signed URLs.
//! - `InventoryRepository`: the typed boundary that turns store rows into
//!   validated `InventoryRecord`s.
//!
//! `MemoryStore` and `MemoryBlobStore` are in-process implementations used by
//! tests and offline tooling.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::error::StoreError;
use crate::schema::{DimensionField, InventoryRecord};
use crate::value::FieldValue;

// ============================================================================
// DATA STORE
// ============================================================================

/// Tables exposed by the data store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Inventory,
    Locations,
    Categories,
    Users,
}

impl Table {
    pub fn name(self) -> &'static str {
        match self {
            Table::Inventory => "inventory",
            Table::Locations => "locations",
            Table::Categories => "categories",
            Table::Users => "users",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Generic query interface of the row store.
pub trait DataStore {
    fn select_all(&self, table: Table) -> Result<Vec<Value>, StoreError>;

    fn filter_by_equality(
        &self,
        table: Table,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Value>, StoreError>;

    /// Inserts a row and returns its id.
    fn insert(&mut self, table: Table, payload: Value) -> Result<String, StoreError>;

    fn update(&mut self, table: Table, id: &str, payload: Value) -> Result<(), StoreError>;

    fn delete(&mut self, table: Table, id: &str) -> Result<(), StoreError>;

    fn count(&self, table: Table) -> Result<usize, StoreError>;
}

/// Row store kept in memory, rows in insertion order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: BTreeMap<Table, Vec<Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn rows(&self, table: Table) -> &[Value] {
        self.tables.get(&table).map(Vec::as_slice).unwrap_or(&[])
    }

    fn position(&self, table: Table, id: &str) -> Result<usize, StoreError> {
        self.rows(table)
            .iter()
            .position(|row| row_id(row).as_deref() == Some(id))
            .ok_or_else(|| StoreError::NotFound { table, id: id.to_string() })
    }
}

fn row_id(row: &Value) -> Option<String> {
    match row.get("id")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl DataStore for MemoryStore {
    fn select_all(&self, table: Table) -> Result<Vec<Value>, StoreError> {
        Ok(self.rows(table).to_vec())
    }

    fn filter_by_equality(
        &self,
        table: Table,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Value>, StoreError> {
        Ok(self
            .rows(table)
            .iter()
            .filter(|row| row.get(field) == Some(value))
            .cloned()
            .collect())
    }

    fn insert(&mut self, table: Table, payload: Value) -> Result<String, StoreError> {
        let Value::Object(mut obj) = payload else {
            return Err(StoreError::InvalidPayload(format!(
                "insert into {} expects an object",
                table
            )));
        };

        let id = match obj.get("id") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => uuid::Uuid::new_v4().to_string(),
        };
        obj.insert("id".to_string(), Value::String(id.clone()));

        self.tables.entry(table).or_default().push(Value::Object(obj));
        log::debug!("inserted row {} into {}", id, table);
        Ok(id)
    }

    fn update(&mut self, table: Table, id: &str, payload: Value) -> Result<(), StoreError> {
        let Value::Object(changes) = payload else {
            return Err(StoreError::InvalidPayload(format!(
                "update of {} expects an object",
                table
            )));
        };

        let index = self.position(table, id)?;
        let row = self
            .tables
            .get_mut(&table)
            .and_then(|rows| rows.get_mut(index));
        if let Some(Value::Object(row)) = row {
            for (key, value) in changes {
                // The id is the row's identity; an update never moves a row.
                if key != "id" {
                    row.insert(key, value);
                }
            }
        }
        Ok(())
    }

    fn delete(&mut self, table: Table, id: &str) -> Result<(), StoreError> {
        let index = self.position(table, id)?;
        if let Some(rows) = self.tables.get_mut(&table) {
            rows.remove(index);
        }
        Ok(())
    }

    fn count(&self, table: Table) -> Result<usize, StoreError> {
        Ok(self.rows(table).len())
    }
}

// ============================================================================
// INVENTORY REPOSITORY
// ============================================================================

/// Typed access to the inventory table.
pub struct InventoryRepository<S: DataStore> {
    store: S,
}

impl<S: DataStore> InventoryRepository<S> {
    pub fn new(store: S) -> Self {
        InventoryRepository { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    /// Loads every inventory row. Rows failing validation are logged and
    /// skipped so one malformed row cannot blank the whole dashboard.
    pub fn load_records(&self) -> Result<Vec<InventoryRecord>, StoreError> {
        let rows = self.store.select_all(Table::Inventory)?;
        Ok(validate_rows(rows))
    }

    /// Loads records whose dimension column equals `value`.
    pub fn records_where(
        &self,
        field: DimensionField,
        value: &FieldValue,
    ) -> Result<Vec<InventoryRecord>, StoreError> {
        let needle = match value {
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
        };
        let rows = self.store.filter_by_equality(Table::Inventory, field.column_name(), &needle)?;
        Ok(validate_rows(rows))
    }

    pub fn add(&mut self, record: &InventoryRecord) -> Result<String, StoreError> {
        self.store.insert(Table::Inventory, record.to_json())
    }

    pub fn save(&mut self, id: &str, record: &InventoryRecord) -> Result<(), StoreError> {
        self.store.update(Table::Inventory, id, record.to_json())
    }

    pub fn remove(&mut self, id: &str) -> Result<(), StoreError> {
        self.store.delete(Table::Inventory, id)
    }

    pub fn count(&self) -> Result<usize, StoreError> {
        self.store.count(Table::Inventory)
    }
}

fn validate_rows(rows: Vec<Value>) -> Vec<InventoryRecord> {
    let total = rows.len();
    let records: Vec<InventoryRecord> = rows
        .iter()
        .filter_map(|row| match InventoryRecord::from_json(row) {
            Ok(record) => Some(record),
            Err(e) => {
                log::warn!("skipping inventory row {:?}: {}", row_id(row), e);
                None
            }
        })
        .collect();
    log::debug!("validated {}/{} inventory rows", records.len(), total);
    records
}

// ============================================================================
// BLOB STORE
// ============================================================================

/// Attachment storage.
pub trait BlobStore {
    /// Stores `bytes` under `path` and returns its public URL.
    fn upload(&mut self, path: &str, bytes: &[u8]) -> Result<String, StoreError>;

    /// Returns a URL for `path` that stays valid for `ttl_seconds`.
    fn create_signed_url(&self, path: &str, ttl_seconds: u64) -> Result<String, StoreError>;
}

#[derive(Debug)]
pub struct MemoryBlobStore {
    base_url: String,
    blobs: HashMap<String, Vec<u8>>,
}

impl MemoryBlobStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        MemoryBlobStore {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            blobs: HashMap::new(),
        }
    }

    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.blobs.get(path.trim_start_matches('/')).map(Vec::as_slice)
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

impl BlobStore for MemoryBlobStore {
    fn upload(&mut self, path: &str, bytes: &[u8]) -> Result<String, StoreError> {
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            return Err(StoreError::InvalidPath(path.to_string()));
        }
        self.blobs.insert(path.to_string(), bytes.to_vec());
        Ok(self.url_for(path))
    }

    fn create_signed_url(&self, path: &str, ttl_seconds: u64) -> Result<String, StoreError> {
        let path = path.trim_start_matches('/');
        if !self.blobs.contains_key(path) {
            return Err(StoreError::BlobNotFound(path.to_string()));
        }
        Ok(format!("{}?expires_in={}", self.url_for(path), ttl_seconds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ValueField;
    use serde_json::json;

    fn laptop() -> InventoryRecord {
        InventoryRecord::new("Laptop")
            .with_dimension(DimensionField::Category, "IT")
            .with_value(ValueField::QuantityInStock, 4.0)
    }

    #[test]
    fn test_insert_assigns_id() {
        let mut store = MemoryStore::new();
        let id = store.insert(Table::Locations, json!({ "name": "Store A" })).unwrap();
        assert!(!id.is_empty());

        let rows = store.select_all(Table::Locations).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["id"], json!(id));
        assert_eq!(store.count(Table::Users).unwrap(), 0);
    }

    #[test]
    fn test_insert_rejects_non_object() {
        let mut store = MemoryStore::new();
        assert!(matches!(
            store.insert(Table::Inventory, json!("row")),
            Err(StoreError::InvalidPayload(_))
        ));
    }

    #[test]
    fn test_update_and_delete() {
        let mut store = MemoryStore::new();
        let id = store.insert(Table::Categories, json!({ "name": "IT" })).unwrap();

        store.update(Table::Categories, &id, json!({ "name": "Hardware", "id": "other" })).unwrap();
        let rows = store.filter_by_equality(Table::Categories, "name", &json!("Hardware")).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["id"], json!(id));

        store.delete(Table::Categories, &id).unwrap();
        assert_eq!(store.count(Table::Categories).unwrap(), 0);
        assert!(matches!(
            store.delete(Table::Categories, &id),
            Err(StoreError::NotFound { table: Table::Categories, .. })
        ));
    }

    #[test]
    fn test_repository_skips_invalid_rows() {
        let mut store = MemoryStore::new();
        store.insert(Table::Inventory, laptop().to_json()).unwrap();
        store.insert(Table::Inventory, json!({ "category": "IT" })).unwrap();

        let repo = InventoryRepository::new(store);
        assert_eq!(repo.count().unwrap(), 2);

        let records = repo.load_records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].item_name, "Laptop");
        assert!(records[0].id.is_some());
    }

    #[test]
    fn test_repository_crud() {
        let mut repo = InventoryRepository::new(MemoryStore::new());
        let id = repo.add(&laptop()).unwrap();
        let desk =
            InventoryRecord::new("Desk").with_dimension(DimensionField::Category, "Furniture");
        repo.add(&desk).unwrap();

        let it = repo.records_where(DimensionField::Category, &FieldValue::text("IT")).unwrap();
        assert_eq!(it.len(), 1);

        let updated = laptop().with_value(ValueField::QuantityInStock, 9.0);
        repo.save(&id, &updated).unwrap();
        let it = repo.records_where(DimensionField::Category, &FieldValue::text("IT")).unwrap();
        assert_eq!(it[0].quantity_in_stock, Some(9.0));

        repo.remove(&id).unwrap();
        assert_eq!(repo.count().unwrap(), 1);
    }

    #[test]
    fn test_blob_store_urls() {
        let mut blobs = MemoryBlobStore::new("https://files.example.test/");
        let url = blobs.upload("/invoices/inv-1.pdf", b"%PDF").unwrap();
        assert_eq!(url, "https://files.example.test/invoices/inv-1.pdf");
        assert_eq!(blobs.get("invoices/inv-1.pdf"), Some(&b"%PDF"[..]));

        let signed = blobs.create_signed_url("invoices/inv-1.pdf", 3600).unwrap();
        assert_eq!(signed, "https://files.example.test/invoices/inv-1.pdf?expires_in=3600");

        assert!(matches!(
            blobs.create_signed_url("missing.pdf", 60),
            Err(StoreError::BlobNotFound(_))
        ));
        assert!(matches!(blobs.upload("/", b""), Err(StoreError::InvalidPath(_))));
    }
}
