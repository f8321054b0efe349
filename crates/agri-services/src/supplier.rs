//! Seed supplier directory.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ServiceError, ServiceResult};
use crate::store::{run_blocking, Document, SharedStore};
use crate::AddedRecord;

pub const SUPPLIERS_COLLECTION: &str = "suppliers";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: String,
    pub name: String,
    pub location: Option<String>,
    pub contact: Option<String>,
}

impl Supplier {
    fn from_document(doc: &Document) -> Self {
        Self {
            id: doc.id.clone(),
            name: doc.str_field("name").unwrap_or_default(),
            location: doc.str_field("location"),
            contact: doc.str_field("contact"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewSupplier {
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub contact: Option<String>,
}

impl NewSupplier {
    fn into_document(self) -> Map<String, Value> {
        let mut data = Map::new();
        data.insert("name".into(), Value::String(self.name));
        data.insert("location".into(), self.location.into());
        data.insert("contact".into(), self.contact.into());
        data
    }
}

#[derive(Clone)]
pub struct SupplierDirectory {
    store: SharedStore,
}

impl SupplierDirectory {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> ServiceResult<Vec<Supplier>> {
        let docs = run_blocking(&self.store, |store| store.list(SUPPLIERS_COLLECTION))
            .await?
            .map_err(ServiceError::read("fetch suppliers"))?;

        if docs.is_empty() {
            tracing::info!("No suppliers found, returning empty list");
        }

        Ok(docs.iter().map(Supplier::from_document).collect())
    }

    pub async fn add(&self, supplier: NewSupplier) -> ServiceResult<AddedRecord> {
        let data = supplier.into_document();
        let id = run_blocking(&self.store, move |store| {
            store.insert(SUPPLIERS_COLLECTION, data)
        })
        .await?
        .map_err(ServiceError::write("add supplier"))?;

        tracing::info!("Added supplier {}", id);
        Ok(AddedRecord::new(id, "Supplier added successfully"))
    }
}
