//! The workflow graph state container.
//!
//! `WorkflowStore` is the single owner of live editing state: nodes, edges,
//! metadata, selection and the dirty flag, plus the undo/redo history. Canvas
//! gestures and configuration forms call its mutation methods; nothing else
//! writes to the graph.
//!
//! Every recorded mutation applies the change and then hands the resulting
//! snapshot to the history ring, which pushes the state it previously held
//! (the pre-mutation graph) onto its undo stack.
//!
//! One store is constructed per editing session.

use history::{History, DEFAULT_CAPACITY};
use tracing::debug;

use crate::clipboard::{self, CopiedNodes, PasteOptions};
use crate::models::{
    Config, WireWorkflowDefinition, WorkflowEdge, WorkflowGraphSnapshot, WorkflowNode,
    WorkflowStatus,
};
use crate::normalize::{denormalize, normalize, normalize_edge};
use crate::validate::{validate_workflow, ValidationReport};
use crate::MalformedNodeError;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Tuning knobs for the store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Maximum number of undo steps retained.
    pub history_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_CAPACITY,
        }
    }
}

// ---------------------------------------------------------------------------
// NodePatch
// ---------------------------------------------------------------------------

/// Partial update applied by [`WorkflowStore::update_node`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodePatch {
    /// Replaces the label when set.
    pub label: Option<String>,
    /// Shallow-merged into the node's config: each key overwrites.
    pub config: Config,
}

impl NodePatch {
    pub fn label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }

    pub fn with_config(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }
}

// ---------------------------------------------------------------------------
// WorkflowStore
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct WorkflowStore {
    nodes: Vec<WorkflowNode>,
    edges: Vec<WorkflowEdge>,
    selected_node_id: Option<String>,
    workflow_name: String,
    workflow_description: String,
    workflow_status: WorkflowStatus,
    is_dirty: bool,
    history: History<WorkflowGraphSnapshot>,
}

impl Default for WorkflowStore {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkflowStore {
    /// An empty, clean store with the default history depth.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            selected_node_id: None,
            workflow_name: String::new(),
            workflow_description: String::new(),
            workflow_status: WorkflowStatus::default(),
            is_dirty: false,
            history: History::new(WorkflowGraphSnapshot::default(), config.history_capacity),
        }
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub fn nodes(&self) -> &[WorkflowNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[WorkflowEdge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&WorkflowNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&WorkflowEdge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn selected_node_id(&self) -> Option<&str> {
        self.selected_node_id.as_deref()
    }

    pub fn selected_node(&self) -> Option<&WorkflowNode> {
        self.selected_node_id.as_deref().and_then(|id| self.node(id))
    }

    pub fn workflow_name(&self) -> &str {
        &self.workflow_name
    }

    pub fn workflow_description(&self) -> &str {
        &self.workflow_description
    }

    pub fn workflow_status(&self) -> WorkflowStatus {
        self.workflow_status
    }

    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_depth(&self) -> usize {
        self.history.undo_depth()
    }

    /// Value copy of the undoable part of the state.
    pub fn snapshot(&self) -> WorkflowGraphSnapshot {
        WorkflowGraphSnapshot {
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
            workflow_name: self.workflow_name.clone(),
            workflow_description: self.workflow_description.clone(),
        }
    }

    /// Run the structural checks over the live graph.
    pub fn validate(&self) -> ValidationReport {
        validate_workflow(&self.nodes, &self.edges)
    }

    // -----------------------------------------------------------------------
    // Whole-list mutations
    // -----------------------------------------------------------------------

    /// Replace the node list. Recorded.
    pub fn set_nodes(&mut self, next: Vec<WorkflowNode>) {
        self.nodes = next;
        self.commit("set_nodes");
    }

    /// Replace the node list with a function of the current one. Recorded.
    pub fn set_nodes_with<F>(&mut self, update: F)
    where
        F: FnOnce(&[WorkflowNode]) -> Vec<WorkflowNode>,
    {
        let next = update(&self.nodes);
        self.set_nodes(next);
    }

    /// Replace the edge list. Recorded.
    pub fn set_edges(&mut self, next: Vec<WorkflowEdge>) {
        self.edges = next;
        self.commit("set_edges");
    }

    /// Replace the edge list with a function of the current one. Recorded.
    pub fn set_edges_with<F>(&mut self, update: F)
    where
        F: FnOnce(&[WorkflowEdge]) -> Vec<WorkflowEdge>,
    {
        let next = update(&self.edges);
        self.set_edges(next);
    }

    // -----------------------------------------------------------------------
    // Node and edge mutations
    // -----------------------------------------------------------------------

    /// Append a node. Recorded.
    ///
    /// The id must not already be in the graph; this is not checked.
    pub fn add_node(&mut self, node: WorkflowNode) {
        debug!(node_id = %node.id, kind = %node.kind, "add node");
        self.nodes.push(node);
        self.commit("add_node");
    }

    /// Merge `patch` into the node `id`. Returns `false` (and changes nothing)
    /// if there is no such node.
    ///
    /// Not recorded in history: configuration forms call this once per field
    /// change. Call [`save_snapshot`](Self::save_snapshot) afterwards to make
    /// the edit its own undo step.
    pub fn update_node(&mut self, id: &str, patch: NodePatch) -> bool {
        let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) else {
            debug!(node_id = %id, "update for unknown node ignored");
            return false;
        };

        if let Some(label) = patch.label {
            node.label = label;
        }
        node.config.extend(patch.config);
        self.is_dirty = true;
        true
    }

    /// Remove a node together with every edge touching it. Recorded.
    pub fn delete_node(&mut self, id: &str) {
        self.nodes.retain(|n| n.id != id);
        let before = self.edges.len();
        self.edges.retain(|e| !e.touches(id));
        debug!(node_id = %id, removed_edges = before - self.edges.len(), "delete node");

        if self.selected_node_id.as_deref() == Some(id) {
            self.selected_node_id = None;
        }
        self.commit("delete_node");
    }

    /// Append an edge. Recorded.
    ///
    /// Endpoints are not checked; [`delete_node`](Self::delete_node) removes
    /// any edge left pointing at a deleted node.
    pub fn add_edge(&mut self, edge: WorkflowEdge) {
        debug!(edge_id = %edge.id, source = %edge.source, target = %edge.target, "add edge");
        self.edges.push(edge);
        self.commit("add_edge");
    }

    /// Remove an edge by id. Recorded.
    pub fn delete_edge(&mut self, id: &str) {
        self.edges.retain(|e| e.id != id);
        debug!(edge_id = %id, "delete edge");
        self.commit("delete_edge");
    }

    /// Copy the given nodes and the edges between them.
    pub fn copy_nodes<S: AsRef<str>>(&self, ids: &[S]) -> Option<CopiedNodes> {
        clipboard::copy_nodes(&self.nodes, &self.edges, ids)
    }

    /// Paste a copied selection as one recorded step. Returns the new node ids.
    pub fn paste(&mut self, copied: &CopiedNodes, options: &PasteOptions) -> Vec<String> {
        let (nodes, edges) = clipboard::paste_nodes(copied, options);
        let ids: Vec<String> = nodes.iter().map(|n| n.id.clone()).collect();
        debug!(nodes = nodes.len(), edges = edges.len(), "paste");

        self.nodes.extend(nodes);
        self.edges.extend(edges);
        self.commit("paste");
        ids
    }

    // -----------------------------------------------------------------------
    // Selection and metadata
    // -----------------------------------------------------------------------

    /// Transient UI state: never recorded, never dirties.
    pub fn set_selected_node_id(&mut self, id: Option<String>) {
        self.selected_node_id = id;
    }

    /// Rename the workflow. Recorded.
    pub fn set_workflow_name(&mut self, name: impl Into<String>) {
        self.workflow_name = name.into();
        self.commit("set_workflow_name");
    }

    /// Recorded.
    pub fn set_workflow_description(&mut self, description: impl Into<String>) {
        self.workflow_description = description.into();
        self.commit("set_workflow_description");
    }

    /// Status transitions dirty the store but are never undoable.
    pub fn set_workflow_status(&mut self, status: WorkflowStatus) {
        debug!(%status, "set workflow status");
        self.workflow_status = status;
        self.is_dirty = true;
    }

    pub fn mark_dirty(&mut self) {
        self.is_dirty = true;
    }

    pub fn mark_clean(&mut self) {
        self.is_dirty = false;
    }

    // -----------------------------------------------------------------------
    // Load / save / reset
    // -----------------------------------------------------------------------

    /// Replace the graph with a persisted definition.
    ///
    /// Name and description are only replaced when the definition carries
    /// non-empty values. The status is taken from `status`, else from the
    /// definition, else kept. The store ends up clean and the history restarts
    /// at the loaded graph, so there is nothing to undo.
    ///
    /// # Errors
    /// [`MalformedNodeError`] from any node; the store is then left untouched.
    pub fn load_workflow(
        &mut self,
        definition: WireWorkflowDefinition,
        status: Option<WorkflowStatus>,
    ) -> Result<(), MalformedNodeError> {
        let nodes = definition
            .nodes
            .iter()
            .map(denormalize)
            .collect::<Result<Vec<_>, _>>()?;

        self.nodes = nodes;
        self.edges = definition.edges;
        if !definition.name.is_empty() {
            self.workflow_name = definition.name;
        }
        if let Some(description) = definition.description.filter(|d| !d.is_empty()) {
            self.workflow_description = description;
        }
        if let Some(status) = status.or(definition.status) {
            self.workflow_status = status;
        }
        self.drop_stale_selection();
        self.is_dirty = false;
        let loaded = self.snapshot();
        self.history.reset(loaded);

        debug!(
            name = %self.workflow_name,
            nodes = self.nodes.len(),
            edges = self.edges.len(),
            "loaded workflow"
        );
        Ok(())
    }

    /// Wire-shape definition of the live graph, ready to send to the backend.
    ///
    /// # Errors
    /// [`MalformedNodeError`] if a node was given an empty id or a non-finite
    /// position through the mutation API.
    pub fn get_workflow_definition(&self) -> Result<WireWorkflowDefinition, MalformedNodeError> {
        let nodes = self
            .nodes
            .iter()
            .map(normalize)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(WireWorkflowDefinition {
            id: None,
            name: self.workflow_name.clone(),
            description: Some(self.workflow_description.clone()).filter(|d| !d.is_empty()),
            status: None,
            nodes,
            edges: self.edges.iter().map(normalize_edge).collect(),
        })
    }

    /// Back to an empty, clean draft. History restarts at the empty graph.
    pub fn reset_workflow(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.selected_node_id = None;
        self.workflow_name.clear();
        self.workflow_description.clear();
        self.workflow_status = WorkflowStatus::default();
        self.is_dirty = false;
        self.history.reset(WorkflowGraphSnapshot::default());
        debug!("reset workflow");
    }

    // -----------------------------------------------------------------------
    // History
    // -----------------------------------------------------------------------

    /// Step back one recorded change. Returns `false` if there was nothing to
    /// undo.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo().cloned() else {
            return false;
        };
        self.restore(snapshot);
        debug!(
            undo = self.history.undo_depth(),
            redo = self.history.redo_depth(),
            "undo"
        );
        true
    }

    /// Re-apply the last undone change. Returns `false` if there was nothing
    /// to redo.
    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo().cloned() else {
            return false;
        };
        self.restore(snapshot);
        debug!(
            undo = self.history.undo_depth(),
            redo = self.history.redo_depth(),
            "redo"
        );
        true
    }

    /// Manual checkpoint of the current graph.
    pub fn save_snapshot(&mut self) {
        let snapshot = self.snapshot();
        self.history.set_state(snapshot);
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    fn commit(&mut self, operation: &'static str) {
        let snapshot = self.snapshot();
        self.history.set_state(snapshot);
        self.is_dirty = true;
        debug!(operation, undo = self.history.undo_depth(), "recorded");
    }

    fn restore(&mut self, snapshot: WorkflowGraphSnapshot) {
        self.nodes = snapshot.nodes;
        self.edges = snapshot.edges;
        self.workflow_name = snapshot.workflow_name;
        self.workflow_description = snapshot.workflow_description;
        self.drop_stale_selection();
        self.is_dirty = true;
    }

    fn drop_stale_selection(&mut self) {
        if let Some(id) = self.selected_node_id.as_deref() {
            if self.node(id).is_none() {
                self.selected_node_id = None;
            }
        }
    }
}
