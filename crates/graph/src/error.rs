//! Graph-level error types.

use thiserror::Error;

/// A node that cannot be placed in a graph without guessing.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MalformedNodeError {
    /// Ids address nodes from edges and selection; an empty one cannot.
    #[error("node has an empty id")]
    EmptyId,

    #[error("node '{node_id}' has a non-finite position")]
    NonFinitePosition { node_id: String },

    /// The node object could not be decoded at all.
    #[error("node #{index} could not be decoded: {message}")]
    Shape {
        index: usize,
        node_id: Option<String>,
        message: String,
    },
}

/// Errors surfaced by loading, saving and decoding workflows.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("malformed node: {0}")]
    Malformed(#[from] MalformedNodeError),

    /// The definition document itself (not one of its nodes) is unusable.
    #[error("invalid workflow definition: {0}")]
    InvalidDefinition(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("persistence error: {0}")]
    Persistence(#[from] persistence::PersistenceError),
}

/// Why a proposed connection was refused.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConnectionRejected {
    #[error("cannot connect into trigger node '{0}'")]
    TargetIsTrigger(String),

    #[error("connection from '{from}' to '{to}' already exists")]
    Duplicate { from: String, to: String },

    #[error("node '{node_id}' accepts at most {limit} input connection(s)")]
    InputLimit { node_id: String, limit: usize },
}
