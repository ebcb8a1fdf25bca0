//! Process-local repository, used by tests and previews.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::{PersistenceError, SaveAck, WorkflowRecord, WorkflowRepository};

#[derive(Debug, Default)]
pub struct InMemoryRepository {
    records: RwLock<HashMap<Uuid, WorkflowRecord>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record as-is, keeping its id.
    pub async fn insert(&self, record: WorkflowRecord) {
        self.records.write().await.insert(record.id, record);
    }
}

#[async_trait]
impl WorkflowRepository for InMemoryRepository {
    async fn create_workflow(
        &self,
        name: &str,
        definition: Value,
    ) -> Result<WorkflowRecord, PersistenceError> {
        let record = WorkflowRecord::new(name, definition);
        debug!(id = %record.id, "created workflow in memory");
        self.records.write().await.insert(record.id, record.clone());
        Ok(record)
    }

    async fn fetch_workflow(&self, id: Uuid) -> Result<WorkflowRecord, PersistenceError> {
        self.records
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(PersistenceError::NotFound(id))
    }

    async fn save_workflow(
        &self,
        id: Uuid,
        definition: Value,
    ) -> Result<SaveAck, PersistenceError> {
        let mut records = self.records.write().await;
        let record = records.get_mut(&id).ok_or(PersistenceError::NotFound(id))?;
        record.apply_definition(definition);
        Ok(record.ack())
    }

    async fn update_status(&self, id: Uuid, status: &str) -> Result<SaveAck, PersistenceError> {
        let mut records = self.records.write().await;
        let record = records.get_mut(&id).ok_or(PersistenceError::NotFound(id))?;
        record.status = status.to_owned();
        record.updated_at = Utc::now();
        Ok(record.ack())
    }

    async fn list_workflows(&self) -> Result<Vec<WorkflowRecord>, PersistenceError> {
        let mut all: Vec<_> = self.records.read().await.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn delete_workflow(&self, id: Uuid) -> Result<(), PersistenceError> {
        self.records
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(PersistenceError::NotFound(id))
    }
}
