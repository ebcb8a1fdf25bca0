//! Editing session bound to a repository.
//!
//! `EditorSession` owns one [`WorkflowStore`] and the id of the workflow it
//! edits. It is the only place where the store meets storage:
//! 1. `open` fetches the record, decodes its definition and loads it.
//! 2. `save` normalizes the live graph and writes it back, then marks clean.
//! 3. `set_status` persists a lifecycle change and mirrors it in the store.

use std::sync::Arc;

use persistence::{SaveAck, WorkflowRecord, WorkflowRepository};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::models::{WireWorkflowDefinition, WorkflowStatus};
use crate::store::{StoreConfig, WorkflowStore};
use crate::GraphError;

pub struct EditorSession<R: WorkflowRepository + ?Sized> {
    repo: Arc<R>,
    workflow_id: Uuid,
    store: WorkflowStore,
}

impl<R: WorkflowRepository + ?Sized> EditorSession<R> {
    /// Load workflow `workflow_id` into a fresh store.
    ///
    /// # Errors
    /// [`GraphError::Persistence`] if the record cannot be fetched, or a
    /// decoding error if its definition is unusable.
    #[instrument(skip_all, fields(workflow_id = %workflow_id))]
    pub async fn open(
        repo: Arc<R>,
        workflow_id: Uuid,
        config: StoreConfig,
    ) -> Result<Self, GraphError> {
        let record = repo.fetch_workflow(workflow_id).await?;
        let (definition, status) = decode_record(record)?;

        let mut store = WorkflowStore::with_config(config);
        store.load_workflow(definition, status)?;
        info!(
            name = %store.workflow_name(),
            nodes = store.nodes().len(),
            "opened workflow"
        );

        Ok(Self { repo, workflow_id, store })
    }

    /// Create an empty workflow named `name` and open it.
    ///
    /// # Errors
    /// As for [`open`](Self::open).
    #[instrument(skip(repo, config))]
    pub async fn create(
        repo: Arc<R>,
        name: &str,
        config: StoreConfig,
    ) -> Result<Self, GraphError> {
        let definition = WireWorkflowDefinition {
            name: name.to_owned(),
            ..WireWorkflowDefinition::default()
        };
        let record = repo
            .create_workflow(name, serde_json::to_value(&definition)?)
            .await?;
        Self::open(repo, record.id, config).await
    }

    /// Discard local edits and load the stored definition again.
    ///
    /// # Errors
    /// As for [`open`](Self::open). On failure the store keeps its state.
    #[instrument(skip(self), fields(workflow_id = %self.workflow_id))]
    pub async fn reload(&mut self) -> Result<(), GraphError> {
        let record = self.repo.fetch_workflow(self.workflow_id).await?;
        let (definition, status) = decode_record(record)?;
        self.store.load_workflow(definition, status)?;
        Ok(())
    }

    /// Persist the live graph. The store is marked clean on success only.
    ///
    /// # Errors
    /// [`GraphError::Malformed`] if a node cannot be normalized, or
    /// [`GraphError::Persistence`] if the write fails.
    #[instrument(skip(self), fields(workflow_id = %self.workflow_id))]
    pub async fn save(&mut self) -> Result<SaveAck, GraphError> {
        let definition = self.store.get_workflow_definition()?;
        let body = serde_json::to_value(&definition)?;

        let ack = self.repo.save_workflow(self.workflow_id, body).await?;
        self.store.mark_clean();
        info!(
            nodes = definition.nodes.len(),
            edges = definition.edges.len(),
            updated_at = %ack.updated_at,
            "saved workflow"
        );
        Ok(ack)
    }

    /// Persist a status transition, then apply it to the store.
    ///
    /// # Errors
    /// [`GraphError::Persistence`] if the write fails; the store is unchanged.
    #[instrument(skip(self), fields(workflow_id = %self.workflow_id))]
    pub async fn set_status(&mut self, status: WorkflowStatus) -> Result<SaveAck, GraphError> {
        let ack = self
            .repo
            .update_status(self.workflow_id, &status.to_string())
            .await?;
        self.store.set_workflow_status(status);
        Ok(ack)
    }

    pub fn workflow_id(&self) -> Uuid {
        self.workflow_id
    }

    pub fn store(&self) -> &WorkflowStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut WorkflowStore {
        &mut self.store
    }

    pub fn into_store(self) -> WorkflowStore {
        self.store
    }
}

/// Definition plus status from a stored record.
///
/// The record's name stands in for an empty definition name. A status string
/// the editor does not know is logged and ignored.
fn decode_record(
    record: WorkflowRecord,
) -> Result<(WireWorkflowDefinition, Option<WorkflowStatus>), GraphError> {
    let mut definition = WireWorkflowDefinition::from_value(record.definition)?;
    if definition.name.is_empty() {
        definition.name = record.name;
    }

    let status = match record.status.parse::<WorkflowStatus>() {
        Ok(status) => Some(status),
        Err(e) => {
            warn!(workflow_id = %record.id, "{e}; keeping current status");
            None
        }
    };

    Ok((definition, status))
}

// ============================================================
// Unit tests
// ============================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Position, WorkflowNode};
    use crate::MalformedNodeError;
    use persistence::{InMemoryRepository, PersistenceError};
    use serde_json::json;

    fn definition() -> serde_json::Value {
        json!({
            "name": "Cart recovery",
            "description": "Nudge after an abandoned cart",
            "nodes": [
                { "id": "t", "type": "TRIGGER", "position": { "x": 0, "y": 0 },
                  "data": { "label": "Cart abandoned", "config": { "triggerConfigId": "event" } } },
                { "id": "d", "type": "LOGIC", "position": { "x": 200, "y": 0 },
                  "data": { "label": "Wait", "config": { "subtype": "delay", "duration": "1h" } } }
            ],
            "edges": [ { "id": "td", "source": "t", "target": "d" } ]
        })
    }

    async fn seeded() -> (Arc<InMemoryRepository>, Uuid) {
        let repo = Arc::new(InMemoryRepository::new());
        let record = repo
            .create_workflow("Cart recovery", definition())
            .await
            .expect("create");
        (repo, record.id)
    }

    #[tokio::test]
    async fn open_loads_a_clean_store() {
        let (repo, id) = seeded().await;
        let session = EditorSession::open(repo, id, StoreConfig::default())
            .await
            .expect("opens");

        let store = session.store();
        assert_eq!(store.workflow_name(), "Cart recovery");
        assert_eq!(store.workflow_description(), "Nudge after an abandoned cart");
        assert_eq!(store.workflow_status(), WorkflowStatus::Draft);
        assert_eq!(store.nodes().len(), 2);
        assert_eq!(store.node("d").map(|n| n.kind.as_str()), Some("delay"));
        assert!(!store.is_dirty());
        assert!(!store.can_undo());
    }

    #[tokio::test]
    async fn open_falls_back_to_record_name_and_known_status() {
        let repo = Arc::new(InMemoryRepository::new());
        let mut record = WorkflowRecord::new("Stored name", json!({ "nodes": [], "edges": [] }));
        record.status = "retired".into();
        let id = record.id;
        repo.insert(record).await;

        let session = EditorSession::open(repo, id, StoreConfig::default()).await.unwrap();
        assert_eq!(session.store().workflow_name(), "Stored name");
        assert_eq!(session.store().workflow_status(), WorkflowStatus::Draft);
    }

    #[tokio::test]
    async fn open_unknown_workflow_fails() {
        let repo = Arc::new(InMemoryRepository::new());
        let missing = Uuid::new_v4();
        let err = EditorSession::open(repo, missing, StoreConfig::default())
            .await
            .err()
            .expect("no such workflow");
        assert!(matches!(
            err,
            GraphError::Persistence(PersistenceError::NotFound(id)) if id == missing
        ));
    }

    #[tokio::test]
    async fn save_writes_normalized_definition_and_marks_clean() {
        let (repo, id) = seeded().await;
        let mut session = EditorSession::open(Arc::clone(&repo), id, StoreConfig::default())
            .await
            .unwrap();

        session.store_mut().add_node(
            WorkflowNode::new("e", "send-email", Position::new(400.0, 0.0)).with_label("Reminder"),
        );
        assert!(session.store().is_dirty());

        session.save().await.expect("saves");
        assert!(!session.store().is_dirty());

        let stored = repo.fetch_workflow(id).await.unwrap();
        let nodes = stored.definition["nodes"].as_array().expect("nodes array");
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[2]["type"], json!("ACTION"));
        assert_eq!(nodes[2]["data"]["config"]["registryId"], json!("send-email"));

        let reopened = EditorSession::open(repo, id, StoreConfig::default()).await.unwrap();
        let kinds: Vec<_> = reopened.store().nodes().iter().map(|n| n.kind.as_str()).collect();
        assert_eq!(kinds, vec!["event", "delay", "send-email"]);
        assert_eq!(reopened.store().node("e").map(|n| n.label.as_str()), Some("Reminder"));
    }

    #[tokio::test]
    async fn save_keeps_undo_history() {
        let (repo, id) = seeded().await;
        let mut session = EditorSession::open(repo, id, StoreConfig::default()).await.unwrap();

        session.store_mut().delete_node("d");
        session.save().await.unwrap();

        assert!(session.store_mut().undo());
        assert!(session.store().node("d").is_some());
        assert!(session.store().is_dirty());
    }

    #[tokio::test]
    async fn set_status_is_persisted_and_applied() {
        let (repo, id) = seeded().await;
        let mut session = EditorSession::open(Arc::clone(&repo), id, StoreConfig::default())
            .await
            .unwrap();

        session.set_status(WorkflowStatus::Active).await.unwrap();
        assert_eq!(session.store().workflow_status(), WorkflowStatus::Active);
        assert_eq!(repo.fetch_workflow(id).await.unwrap().status, "active");
    }

    #[tokio::test]
    async fn failed_reload_leaves_store_untouched() {
        let (repo, id) = seeded().await;
        let mut session = EditorSession::open(Arc::clone(&repo), id, StoreConfig::default())
            .await
            .unwrap();
        session.store_mut().set_workflow_name("Local rename");

        repo.save_workflow(
            id,
            json!({ "nodes": [{ "id": "", "type": "ACTION", "position": { "x": 0, "y": 0 } }] }),
        )
        .await
        .unwrap();

        let err = session.reload().await.unwrap_err();
        assert!(matches!(err, GraphError::Malformed(MalformedNodeError::EmptyId)));
        assert_eq!(session.store().workflow_name(), "Local rename");
        assert_eq!(session.store().nodes().len(), 2);
        assert!(session.store().can_undo());
    }

    #[tokio::test]
    async fn create_opens_an_empty_draft() {
        let repo = Arc::new(InMemoryRepository::new());
        let session = EditorSession::create(Arc::clone(&repo), "Blank", StoreConfig::default())
            .await
            .unwrap();

        assert_eq!(session.store().workflow_name(), "Blank");
        assert!(session.store().nodes().is_empty());
        assert_eq!(repo.list_workflows().await.unwrap().len(), 1);
    }
}
