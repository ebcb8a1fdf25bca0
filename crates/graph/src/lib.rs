//! `graph` crate — the workflow editor's in-memory graph.
//!
//! - [`models`]: editor-shape and wire-shape nodes, edges and definitions.
//! - [`normalize`]: translation between the two node shapes.
//! - [`store`]: [`WorkflowStore`], the single owner of live editing state.
//! - [`validate`]: structural checks run before publishing a workflow.
//! - [`clipboard`]: copy/paste of node selections.
//! - [`session`]: binds a store to a [`persistence::WorkflowRepository`].

pub mod clipboard;
pub mod error;
pub mod models;
pub mod normalize;
pub mod session;
pub mod store;
pub mod validate;

pub use error::{ConnectionRejected, GraphError, MalformedNodeError};
pub use models::{
    Position, WireNode, WireNodeData, WireWorkflowDefinition, WorkflowEdge,
    WorkflowGraphSnapshot, WorkflowNode, WorkflowStatus,
};
pub use normalize::{denormalize, normalize};
pub use session::EditorSession;
pub use store::{NodePatch, StoreConfig, WorkflowStore};
pub use validate::{validate_connection, validate_workflow, ValidationReport};
