//! Crop disease catalog.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ServiceError, ServiceResult};
use crate::store::{run_blocking, Document, SharedStore};
use crate::AddedRecord;

pub const DISEASES_COLLECTION: &str = "diseases";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Disease {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub symptoms: Option<String>,
    pub treatment: Option<String>,
    pub affected_crops: Option<Vec<String>>,
}

impl Disease {
    fn from_document(doc: &Document) -> Self {
        Self {
            id: doc.id.clone(),
            name: doc.str_field("name").unwrap_or_default(),
            description: doc.str_field("description"),
            symptoms: doc.str_field("symptoms"),
            treatment: doc.str_field("treatment"),
            affected_crops: doc.string_list_field("affected_crops"),
        }
    }
}

/// Body of a create request. Any `id` the client sends is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct NewDisease {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub symptoms: Option<String>,
    #[serde(default)]
    pub treatment: Option<String>,
    #[serde(default)]
    pub affected_crops: Option<Vec<String>>,
}

impl NewDisease {
    fn into_document(self) -> Map<String, Value> {
        let mut data = Map::new();
        data.insert("name".into(), Value::String(self.name));
        data.insert("description".into(), self.description.into());
        data.insert("symptoms".into(), self.symptoms.into());
        data.insert("treatment".into(), self.treatment.into());
        data.insert(
            "affected_crops".into(),
            self.affected_crops.unwrap_or_default().into(),
        );
        data
    }
}

#[derive(Clone)]
pub struct DiseaseCatalog {
    store: SharedStore,
}

impl DiseaseCatalog {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// All diseases in the catalog. An empty catalog is not an error.
    pub async fn list(&self) -> ServiceResult<Vec<Disease>> {
        let docs = run_blocking(&self.store, |store| store.list(DISEASES_COLLECTION))
            .await?
            .map_err(ServiceError::read("fetch diseases"))?;

        if docs.is_empty() {
            tracing::info!("No diseases found, returning empty list");
        }

        Ok(docs.iter().map(Disease::from_document).collect())
    }

    /// Store a new disease and return its assigned id.
    pub async fn add(&self, disease: NewDisease) -> ServiceResult<AddedRecord> {
        let data = disease.into_document();
        let id = run_blocking(&self.store, move |store| {
            store.insert(DISEASES_COLLECTION, data)
        })
        .await?
        .map_err(ServiceError::write("add disease"))?;

        tracing::info!("Added disease {}", id);
        Ok(AddedRecord::new(id, "Disease added successfully"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite_store::SqliteDocumentStore;
    use std::sync::Arc;

    fn catalog() -> DiseaseCatalog {
        DiseaseCatalog::new(Arc::new(SqliteDocumentStore::in_memory().unwrap()))
    }

    #[tokio::test]
    async fn test_list_empty() {
        assert!(catalog().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_then_list() {
        let catalog = catalog();
        let added = catalog
            .add(NewDisease {
                name: "Late Blight".into(),
                description: Some("Water mould".into()),
                symptoms: Some("Dark lesions".into()),
                treatment: Some("Copper fungicide".into()),
                affected_crops: Some(vec!["potato".into(), "tomato".into()]),
            })
            .await
            .unwrap();

        assert!(added.success);
        assert_eq!(added.message, "Disease added successfully");

        let diseases = catalog.list().await.unwrap();
        assert_eq!(diseases.len(), 1);
        assert_eq!(
            diseases[0],
            Disease {
                id: added.id,
                name: "Late Blight".into(),
                description: Some("Water mould".into()),
                symptoms: Some("Dark lesions".into()),
                treatment: Some("Copper fungicide".into()),
                affected_crops: Some(vec!["potato".into(), "tomato".into()]),
            }
        );
    }

    #[tokio::test]
    async fn test_missing_crops_stored_as_empty_list() {
        let catalog = catalog();
        catalog
            .add(NewDisease {
                name: "Rust".into(),
                description: None,
                symptoms: None,
                treatment: None,
                affected_crops: None,
            })
            .await
            .unwrap();

        let diseases = catalog.list().await.unwrap();
        assert_eq!(diseases[0].affected_crops, Some(vec![]));
        assert_eq!(diseases[0].description, None);
    }

    #[test]
    fn test_client_id_is_ignored() {
        let body: NewDisease =
            serde_json::from_str(r#"{"id": "client-chosen", "name": "Smut"}"#).unwrap();
        let doc = body.into_document();
        assert!(!doc.contains_key("id"));
        assert_eq!(doc["name"], "Smut");
    }
}
