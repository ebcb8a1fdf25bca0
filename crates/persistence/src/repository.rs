//! The storage contract consumed by the editor.

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::{PersistenceError, SaveAck, WorkflowRecord};

/// Workflow storage. Every method is one round trip to the backing store.
#[async_trait]
pub trait WorkflowRepository: Send + Sync {
    /// Insert a new workflow in `draft` status.
    async fn create_workflow(
        &self,
        name: &str,
        definition: Value,
    ) -> Result<WorkflowRecord, PersistenceError>;

    /// Fetch a single workflow by id.
    async fn fetch_workflow(&self, id: Uuid) -> Result<WorkflowRecord, PersistenceError>;

    /// Overwrite the definition of an existing workflow.
    ///
    /// Returns [`PersistenceError::NotFound`] if `id` is unknown.
    async fn save_workflow(&self, id: Uuid, definition: Value)
        -> Result<SaveAck, PersistenceError>;

    /// Record a status transition.
    async fn update_status(&self, id: Uuid, status: &str) -> Result<SaveAck, PersistenceError>;

    /// All workflows, newest first.
    async fn list_workflows(&self) -> Result<Vec<WorkflowRecord>, PersistenceError>;

    /// Permanently delete a workflow.
    async fn delete_workflow(&self, id: Uuid) -> Result<(), PersistenceError>;
}
