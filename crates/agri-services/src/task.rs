//! Scheduled farm tasks.
//!
//! Lifecycle: created (`completed = false`) <-> completed via toggle, and
//! delete as a terminal step.

use agri_core::ListFailurePolicy;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ServiceError, ServiceResult};
use crate::store::{run_blocking, Direction, Document, DocumentStore, SharedStore, StoreError};

pub const TASKS_COLLECTION: &str = "tasks";

/// Conditional-write attempts before a toggle gives up.
const MAX_TOGGLE_ATTEMPTS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub scheduled_time: String,
    pub completed: bool,
    pub created_at: String,
}

impl Task {
    fn from_document(doc: &Document) -> Self {
        Self {
            id: doc.id.clone(),
            title: doc.str_field("title").unwrap_or_default(),
            scheduled_time: doc.str_field("scheduled_time").unwrap_or_default(),
            completed: doc.bool_field("completed").unwrap_or(false),
            created_at: doc.str_field("created_at").unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTask {
    pub title: String,
    pub scheduled_time: String,
}

#[derive(Clone)]
pub struct TaskService {
    store: SharedStore,
    list_policy: ListFailurePolicy,
}

impl TaskService {
    pub fn new(store: SharedStore, list_policy: ListFailurePolicy) -> Self {
        Self { store, list_policy }
    }

    /// Tasks, newest first.
    ///
    /// With `ListFailurePolicy::FailOpen` a store failure is logged and an
    /// empty list returned.
    pub async fn list(&self) -> ServiceResult<Vec<Task>> {
        let result = run_blocking(&self.store, |store| {
            store.list_ordered(TASKS_COLLECTION, "created_at", Direction::Descending)
        })
        .await
        .map_err(ServiceError::from)
        .and_then(|r| r.map_err(ServiceError::read("fetch tasks")));

        match (result, self.list_policy) {
            (Ok(docs), _) => Ok(docs.iter().map(Task::from_document).collect()),
            (Err(e), ListFailurePolicy::FailOpen) => {
                tracing::error!("Error fetching tasks, returning empty list: {}", e);
                Ok(Vec::new())
            }
            (Err(e), ListFailurePolicy::FailClosed) => Err(e),
        }
    }

    /// Create a task. `created_at` is stamped here; `completed` starts false.
    pub async fn add(&self, new_task: NewTask) -> ServiceResult<Task> {
        let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);

        let mut data = Map::new();
        data.insert("title".into(), Value::String(new_task.title.clone()));
        data.insert(
            "scheduled_time".into(),
            Value::String(new_task.scheduled_time.clone()),
        );
        data.insert("completed".into(), Value::Bool(false));
        data.insert("created_at".into(), Value::String(created_at.clone()));

        let id = run_blocking(&self.store, move |store| store.insert(TASKS_COLLECTION, data))
            .await?
            .map_err(ServiceError::write("add task"))?;

        tracing::info!("Added task {}", id);
        Ok(Task {
            id,
            title: new_task.title,
            scheduled_time: new_task.scheduled_time,
            completed: false,
            created_at,
        })
    }

    /// Delete a task. Unknown ids are not an error.
    pub async fn delete(&self, id: &str) -> ServiceResult<()> {
        let id = id.to_string();
        run_blocking(&self.store, move |store| {
            store.delete(TASKS_COLLECTION, &id)?;
            tracing::info!("Deleted task {}", id);
            Ok::<_, StoreError>(())
        })
        .await?
        .map_err(ServiceError::write("delete task"))
    }

    /// Flip `completed` and return the updated task.
    ///
    /// The write is conditional on the value that was read, so two concurrent
    /// toggles both take effect instead of collapsing into one.
    pub async fn toggle(&self, id: &str) -> ServiceResult<Task> {
        let id = id.to_string();
        run_blocking(&self.store, move |store| toggle_blocking(store, &id)).await?
    }
}

fn toggle_blocking(store: &dyn DocumentStore, id: &str) -> ServiceResult<Task> {
    for attempt in 1..=MAX_TOGGLE_ATTEMPTS {
        let doc = store
            .get(TASKS_COLLECTION, id)
            .map_err(ServiceError::read("toggle task"))?
            .ok_or(ServiceError::NotFound("Task"))?;

        let prior = doc.raw_field("completed");
        let completed = !prior.as_bool().unwrap_or(false);

        let mut patch = Map::new();
        patch.insert("completed".into(), Value::Bool(completed));

        let applied = store
            .update_if(TASKS_COLLECTION, id, "completed", &prior, patch)
            .map_err(ServiceError::write("toggle task"))?;

        if applied {
            let mut task = Task::from_document(&doc);
            task.completed = completed;
            tracing::info!("Toggled task {} to completed={}", id, completed);
            return Ok(task);
        }

        tracing::warn!(
            "Task {} changed during toggle, retrying (attempt {} of {})",
            id,
            attempt,
            MAX_TOGGLE_ATTEMPTS
        );
    }

    Err(ServiceError::Write {
        action: "toggle task",
        source: StoreError::storage(format!(
            "task {} kept changing; gave up after {} attempts",
            id, MAX_TOGGLE_ATTEMPTS
        )),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite_store::SqliteDocumentStore;
    use std::sync::Arc;

    fn service() -> TaskService {
        TaskService::new(
            Arc::new(SqliteDocumentStore::in_memory().unwrap()),
            ListFailurePolicy::FailOpen,
        )
    }

    fn new_task(title: &str) -> NewTask {
        NewTask {
            title: title.to_string(),
            scheduled_time: "2024-06-01T06:00:00".to_string(),
        }
    }

    #[tokio::test]
    async fn test_add_sets_defaults() {
        let task = service().add(new_task("Irrigate field A")).await.unwrap();

        assert!(!task.id.is_empty());
        assert!(!task.completed);
        assert!(!task.created_at.is_empty());
        assert!(chrono::DateTime::parse_from_rfc3339(&task.created_at).is_ok());
        assert_eq!(task.title, "Irrigate field A");
        assert_eq!(task.scheduled_time, "2024-06-01T06:00:00");
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let service = service();
        let first = service.add(new_task("first")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        let second = service.add(new_task("second")).await.unwrap();

        let tasks = service.list().await.unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].id, second.id);
        assert_eq!(tasks[1].id, first.id);
    }

    #[tokio::test]
    async fn test_toggle_is_involutive() {
        let service = service();
        let task = service.add(new_task("Spray neem oil")).await.unwrap();

        let once = service.toggle(&task.id).await.unwrap();
        assert!(once.completed);

        let twice = service.toggle(&task.id).await.unwrap();
        assert_eq!(twice.completed, task.completed);
        assert_eq!(twice.title, task.title);
        assert_eq!(twice.created_at, task.created_at);
    }

    #[tokio::test]
    async fn test_toggle_missing_is_not_found() {
        let err = service().toggle("does-not-exist").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Task not found");
    }

    #[tokio::test]
    async fn test_toggle_after_delete_is_not_found() {
        let service = service();
        let task = service.add(new_task("Harvest")).await.unwrap();
        service.delete(&task.id).await.unwrap();

        assert!(service.toggle(&task.id).await.unwrap_err().is_not_found());
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_unknown_id_succeeds() {
        service().delete("never-existed").await.unwrap();
    }

    #[tokio::test]
    async fn test_concurrent_toggles_both_apply() {
        let service = service();
        let task = service.add(new_task("Weed")).await.unwrap();

        let (a, b) = tokio::join!(service.toggle(&task.id), service.toggle(&task.id));
        assert_ne!(a.unwrap().completed, b.unwrap().completed);

        let tasks = service.list().await.unwrap();
        assert!(!tasks[0].completed);
    }
}
