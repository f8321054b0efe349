//! SQLite-based document storage.
//!
//! All collections share one `documents` table; each row holds the JSON body
//! of a single document. `seq` preserves insertion order.

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::{Map, Value};
use std::path::Path;

use crate::store::{Direction, Document, DocumentStore, StoreError, StoreResult};

pub struct SqliteDocumentStore {
    conn: Mutex<Connection>,
}

impl SqliteDocumentStore {
    /// Open (or create) a store at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (tests, throwaway instances).
    pub fn in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> anyhow::Result<()> {
        self.conn.lock().execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                collection TEXT NOT NULL,
                id TEXT NOT NULL,
                data TEXT NOT NULL,
                UNIQUE (collection, id)
            );

            CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents(collection, seq);
            "#,
        )?;
        Ok(())
    }

    fn row_to_document(id: String, data: String) -> StoreResult<Document> {
        match serde_json::from_str::<Value>(&data)? {
            Value::Object(map) => Ok(Document { id, data: map }),
            other => Err(StoreError::InvalidDocument(format!(
                "document {} is not an object: {}",
                id, other
            ))),
        }
    }

    fn read_data(
        conn: &Connection,
        collection: &str,
        id: &str,
    ) -> StoreResult<Option<Map<String, Value>>> {
        let data: Option<String> = conn
            .query_row(
                "SELECT data FROM documents WHERE collection = ?1 AND id = ?2",
                params![collection, id],
                |row| row.get(0),
            )
            .optional()?;

        data.map(|d| Self::row_to_document(id.to_string(), d).map(|doc| doc.data))
            .transpose()
    }

    fn write_data(
        conn: &Connection,
        collection: &str,
        id: &str,
        data: &Map<String, Value>,
    ) -> StoreResult<()> {
        let body = serde_json::to_string(data)?;
        conn.execute(
            "UPDATE documents SET data = ?3 WHERE collection = ?1 AND id = ?2",
            params![collection, id, body],
        )?;
        Ok(())
    }
}

/// Field names end up in a JSON path, so keep them to plain identifiers.
fn validate_field_name(field: &str) -> StoreResult<()> {
    let valid = !field.is_empty()
        && field
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidDocument(format!(
            "unsupported field name: {:?}",
            field
        )))
    }
}

impl DocumentStore for SqliteDocumentStore {
    fn insert(&self, collection: &str, data: Map<String, Value>) -> StoreResult<String> {
        let id = uuid::Uuid::new_v4().simple().to_string();
        let body = serde_json::to_string(&data)?;

        self.conn.lock().execute(
            "INSERT INTO documents (collection, id, data) VALUES (?1, ?2, ?3)",
            params![collection, id, body],
        )?;

        tracing::debug!("Inserted document {}/{}", collection, id);
        Ok(id)
    }

    fn list(&self, collection: &str) -> StoreResult<Vec<Document>> {
        let conn = self.conn.lock();
        let mut stmt =
            conn.prepare("SELECT id, data FROM documents WHERE collection = ?1 ORDER BY seq")?;

        let rows = stmt
            .query_map(params![collection], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, data)| Self::row_to_document(id, data))
            .collect()
    }

    fn list_ordered(
        &self,
        collection: &str,
        field: &str,
        direction: Direction,
    ) -> StoreResult<Vec<Document>> {
        validate_field_name(field)?;

        let sql = match direction {
            Direction::Ascending => {
                "SELECT id, data FROM documents WHERE collection = ?1
                 ORDER BY json_extract(data, ?2) ASC, seq ASC"
            }
            Direction::Descending => {
                "SELECT id, data FROM documents WHERE collection = ?1
                 ORDER BY json_extract(data, ?2) DESC, seq DESC"
            }
        };
        let path = format!("$.{}", field);

        let conn = self.conn.lock();
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map(params![collection, path], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, data)| Self::row_to_document(id, data))
            .collect()
    }

    fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        let conn = self.conn.lock();
        Ok(Self::read_data(&conn, collection, id)?.map(|data| Document {
            id: id.to_string(),
            data,
        }))
    }

    fn update(&self, collection: &str, id: &str, patch: Map<String, Value>) -> StoreResult<()> {
        let conn = self.conn.lock();
        let mut data = Self::read_data(&conn, collection, id)?
            .ok_or_else(|| StoreError::not_found(collection, id))?;

        data.extend(patch);
        Self::write_data(&conn, collection, id, &data)
    }

    fn update_if(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        expected: &Value,
        patch: Map<String, Value>,
    ) -> StoreResult<bool> {
        // Read and write happen under one lock acquisition.
        let conn = self.conn.lock();
        let Some(mut data) = Self::read_data(&conn, collection, id)? else {
            return Ok(false);
        };

        let current = data.get(field).unwrap_or(&Value::Null);
        if current != expected {
            tracing::debug!(
                "Conditional update skipped for {}/{}: {} is {}, expected {}",
                collection,
                id,
                field,
                current,
                expected
            );
            return Ok(false);
        }

        data.extend(patch);
        Self::write_data(&conn, collection, id, &data)?;
        Ok(true)
    }

    fn delete(&self, collection: &str, id: &str) -> StoreResult<()> {
        let removed = self.conn.lock().execute(
            "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
            params![collection, id],
        )?;
        tracing::debug!("Deleted {}/{} ({} rows)", collection, id, removed);
        Ok(())
    }
}
