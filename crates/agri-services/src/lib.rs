//! Document-backed services: disease catalog, supplier directory and tasks.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod disease;
pub mod error;
pub mod sqlite_store;
pub mod store;
pub mod supplier;
pub mod task;

pub use disease::{Disease, DiseaseCatalog, NewDisease};
pub use error::{ServiceError, ServiceResult};
pub use sqlite_store::SqliteDocumentStore;
pub use store::{Direction, Document, DocumentStore, SharedStore, StoreError, StoreResult};
pub use supplier::{NewSupplier, Supplier, SupplierDirectory};
pub use task::{NewTask, Task, TaskService};

use serde::Serialize;

/// Reply for a successful create on the catalog collections.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddedRecord {
    pub success: bool,
    pub id: String,
    pub message: String,
}

impl AddedRecord {
    pub fn new(id: String, message: &str) -> Self {
        Self {
            success: true,
            id,
            message: message.to_string(),
        }
    }
}
