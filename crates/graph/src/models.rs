//! Node, edge and definition shapes.
//!
//! Two node shapes exist. The *editor* shape ([`WorkflowNode`]) carries a
//! fine-grained `kind`; the *wire* shape ([`WireNode`]) only carries one of
//! three categories and folds the kind into its config map. Edges are the
//! same in both.

use std::fmt;
use std::str::FromStr;

use nodes::{NodeCategory, NodeSettings};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{GraphError, MalformedNodeError};

/// Open key → value settings map carried by every node.
pub type Config = Map<String, Value>;

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// Canvas-space coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

// ---------------------------------------------------------------------------
// WorkflowNode (editor shape)
// ---------------------------------------------------------------------------

/// A node as the editor manipulates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowNode {
    /// Unique within a graph, stable for the node's lifetime.
    pub id: String,
    /// Editor-level discriminator, e.g. `send-webhook` or `condition`.
    pub kind: String,
    pub position: Position,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub config: Config,
}

impl WorkflowNode {
    pub fn new(id: impl Into<String>, kind: impl Into<String>, position: Position) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            position,
            label: String::new(),
            config: Config::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_config(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }

    /// Typed view over `config` for this node's kind.
    pub fn settings(&self) -> NodeSettings {
        NodeSettings::decode(&self.kind, &self.config)
    }
}

// ---------------------------------------------------------------------------
// WorkflowEdge
// ---------------------------------------------------------------------------

/// Directed connection between two nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    /// Output port on the source, e.g. a condition's `true` branch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
}

impl WorkflowEdge {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            source_handle: None,
            target_handle: None,
        }
    }

    pub fn with_source_handle(mut self, handle: impl Into<String>) -> Self {
        self.source_handle = Some(handle.into());
        self
    }

    pub fn with_target_handle(mut self, handle: impl Into<String>) -> Self {
        self.target_handle = Some(handle.into());
        self
    }

    /// `true` if either endpoint is `node_id`.
    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}

// ---------------------------------------------------------------------------
// WireNode (backend shape)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WireNodeData {
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub config: Config,
}

/// A node as exchanged with the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: NodeCategory,
    pub position: Position,
    #[serde(default)]
    pub data: WireNodeData,
}

// ---------------------------------------------------------------------------
// WorkflowStatus
// ---------------------------------------------------------------------------

/// Lifecycle status of the persisted workflow. Never part of undo history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowStatus {
    #[default]
    Draft,
    Active,
    Inactive,
    Paused,
    Archived,
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::Active => write!(f, "active"),
            Self::Inactive => write!(f, "inactive"),
            Self::Paused => write!(f, "paused"),
            Self::Archived => write!(f, "archived"),
        }
    }
}

impl FromStr for WorkflowStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft"    => Ok(Self::Draft),
            "active"   => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "paused"   => Ok(Self::Paused),
            "archived" => Ok(Self::Archived),
            other      => Err(format!("unknown workflow status: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// WireWorkflowDefinition
// ---------------------------------------------------------------------------

/// The document exchanged with the persistence API.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WireWorkflowDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<WorkflowStatus>,
    #[serde(default)]
    pub nodes: Vec<WireNode>,
    #[serde(default)]
    pub edges: Vec<WorkflowEdge>,
}

/// Same document with nodes left undecoded, so each node's failure can be
/// reported on its own.
#[derive(Deserialize)]
struct RawDefinition {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    status: Option<WorkflowStatus>,
    #[serde(default)]
    nodes: Vec<Value>,
    #[serde(default)]
    edges: Vec<WorkflowEdge>,
}

impl WireWorkflowDefinition {
    /// Decode a definition document.
    ///
    /// # Errors
    /// - [`MalformedNodeError::Shape`] (wrapped) if any node cannot be decoded.
    /// - [`GraphError::InvalidDefinition`] for any other shape problem.
    pub fn from_value(value: Value) -> Result<Self, GraphError> {
        let raw: RawDefinition = serde_json::from_value(value)
            .map_err(|e| GraphError::InvalidDefinition(e.to_string()))?;

        let nodes = raw
            .nodes
            .into_iter()
            .enumerate()
            .map(|(index, node)| {
                let node_id = node.get("id").and_then(Value::as_str).map(str::to_owned);
                serde_json::from_value::<WireNode>(node).map_err(|e| MalformedNodeError::Shape {
                    index,
                    node_id,
                    message: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            id: raw.id,
            name: raw.name,
            description: raw.description,
            status: raw.status,
            nodes,
            edges: raw.edges,
        })
    }
}

// ---------------------------------------------------------------------------
// WorkflowGraphSnapshot
// ---------------------------------------------------------------------------

/// One unit of undo history. Selection, dirty flag and status are excluded.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WorkflowGraphSnapshot {
    pub nodes: Vec<WorkflowNode>,
    pub edges: Vec<WorkflowEdge>,
    pub workflow_name: String,
    pub workflow_description: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn definition_decodes_camel_case_edges() {
        let def = WireWorkflowDefinition::from_value(json!({
            "name": "welcome",
            "nodes": [
                { "id": "a", "type": "LOGIC", "position": { "x": 0, "y": 0 },
                  "data": { "label": "Check", "config": { "subtype": "condition" } } }
            ],
            "edges": [
                { "id": "e1", "source": "a", "target": "b", "sourceHandle": "true" }
            ]
        }))
        .expect("valid definition");

        assert_eq!(def.nodes[0].node_type, NodeCategory::Logic);
        assert_eq!(def.edges[0].source_handle.as_deref(), Some("true"));
        assert_eq!(def.edges[0].target_handle, None);
    }

    #[test]
    fn node_without_position_is_malformed() {
        let err = WireWorkflowDefinition::from_value(json!({
            "name": "broken",
            "nodes": [
                { "id": "ok", "type": "ACTION", "position": { "x": 1, "y": 2 } },
                { "id": "lost", "type": "ACTION" }
            ]
        }))
        .unwrap_err();

        assert!(matches!(
            err,
            GraphError::Malformed(MalformedNodeError::Shape { index: 1, node_id: Some(ref id), .. })
                if id == "lost"
        ));
    }

    #[test]
    fn unknown_node_type_is_malformed() {
        let err = WireWorkflowDefinition::from_value(json!({
            "nodes": [{ "id": "d", "type": "DATA", "position": { "x": 0, "y": 0 } }]
        }))
        .unwrap_err();
        assert!(matches!(err, GraphError::Malformed(_)));
    }

    #[test]
    fn non_object_definition_is_invalid() {
        let err = WireWorkflowDefinition::from_value(json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, GraphError::InvalidDefinition(_)));
    }

    #[test]
    fn status_parses_from_lowercase() {
        assert_eq!("paused".parse::<WorkflowStatus>(), Ok(WorkflowStatus::Paused));
        assert!("deleted".parse::<WorkflowStatus>().is_err());
        assert_eq!(WorkflowStatus::Archived.to_string(), "archived");
    }
}
