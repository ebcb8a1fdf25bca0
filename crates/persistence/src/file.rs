//! Directory-backed repository: one pretty-printed JSON file per workflow.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::fs;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{PersistenceError, SaveAck, WorkflowRecord, WorkflowRepository};

#[derive(Debug, Clone)]
pub struct FileRepository {
    root: PathBuf,
}

impl FileRepository {
    /// Use `root` as the storage directory. It is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, id: Uuid) -> PathBuf {
        self.root.join(format!("{id}.json"))
    }

    async fn read(&self, id: Uuid) -> Result<WorkflowRecord, PersistenceError> {
        let bytes = match fs::read(self.path_for(id)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PersistenceError::NotFound(id));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn write(&self, record: &WorkflowRecord) -> Result<(), PersistenceError> {
        fs::create_dir_all(&self.root).await?;
        let bytes = serde_json::to_vec_pretty(record)?;
        fs::write(self.path_for(record.id), bytes).await?;
        debug!(id = %record.id, "wrote workflow file");
        Ok(())
    }
}

#[async_trait]
impl WorkflowRepository for FileRepository {
    async fn create_workflow(
        &self,
        name: &str,
        definition: Value,
    ) -> Result<WorkflowRecord, PersistenceError> {
        let record = WorkflowRecord::new(name, definition);
        self.write(&record).await?;
        info!(id = %record.id, root = %self.root.display(), "created workflow");
        Ok(record)
    }

    async fn fetch_workflow(&self, id: Uuid) -> Result<WorkflowRecord, PersistenceError> {
        self.read(id).await
    }

    async fn save_workflow(
        &self,
        id: Uuid,
        definition: Value,
    ) -> Result<SaveAck, PersistenceError> {
        let mut record = self.read(id).await?;
        record.apply_definition(definition);
        self.write(&record).await?;
        Ok(record.ack())
    }

    async fn update_status(&self, id: Uuid, status: &str) -> Result<SaveAck, PersistenceError> {
        let mut record = self.read(id).await?;
        record.status = status.to_owned();
        record.updated_at = Utc::now();
        self.write(&record).await?;
        Ok(record.ack())
    }

    async fn list_workflows(&self) -> Result<Vec<WorkflowRecord>, PersistenceError> {
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let bytes = fs::read(&path).await?;
            match serde_json::from_slice::<WorkflowRecord>(&bytes) {
                Ok(record) => records.push(record),
                Err(e) => warn!("skipping unreadable workflow file {}: {}", path.display(), e),
            }
        }

        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    async fn delete_workflow(&self, id: Uuid) -> Result<(), PersistenceError> {
        match fs::remove_file(self.path_for(id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(PersistenceError::NotFound(id))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scratch_repo() -> FileRepository {
        FileRepository::new(std::env::temp_dir().join(format!("workflow-store-{}", Uuid::new_v4())))
    }

    #[tokio::test]
    async fn records_survive_a_round_trip_through_disk() {
        let repo = scratch_repo();
        let definition = json!({ "name": "digest", "nodes": [], "edges": [] });
        let created = repo.create_workflow("digest", definition.clone()).await.unwrap();

        let fetched = repo.fetch_workflow(created.id).await.unwrap();
        assert_eq!(fetched, created);

        let listed = repo.list_workflows().await.unwrap();
        assert_eq!(listed.len(), 1);

        repo.delete_workflow(created.id).await.unwrap();
        assert!(matches!(
            repo.fetch_workflow(created.id).await,
            Err(PersistenceError::NotFound(_))
        ));

        let _ = fs::remove_dir_all(repo.root()).await;
    }

    #[tokio::test]
    async fn listing_a_missing_directory_is_empty() {
        let repo = scratch_repo();
        assert!(repo.list_workflows().await.unwrap().is_empty());
    }
}
