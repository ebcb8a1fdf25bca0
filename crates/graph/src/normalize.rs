//! Translation between wire nodes and editor nodes.
//!
//! On the wire the editor kind lives inside `data.config` under the
//! category's discriminator key (`triggerConfigId`, `subtype` or
//! `registryId`). Denormalizing surfaces it as `kind` without removing it from
//! the config; normalizing folds it back in. Config keys neither function
//! interprets pass through unchanged.
//!
//! The wire only carries the discriminator value, so an editor kind that
//! differs from it (`schedule-trigger` with `triggerConfigId: "scheduler"`)
//! comes back from the wire as the discriminator value. The wire node itself
//! is stable: normalizing again yields the same wire node.

use nodes::{catalog, NodeCategory};
use serde_json::Value;
use tracing::warn;

use crate::models::{Position, WireNode, WireNodeData, WorkflowEdge, WorkflowNode};
use crate::MalformedNodeError;

/// Wire → editor.
///
/// # Errors
/// [`MalformedNodeError`] if the id is empty or the position is not finite.
pub fn denormalize(wire: &WireNode) -> Result<WorkflowNode, MalformedNodeError> {
    check_addressable(&wire.id, wire.position)?;

    let category = wire.node_type;
    let kind = wire
        .data
        .config
        .get(category.discriminator_key())
        .and_then(Value::as_str)
        .filter(|kind| !kind.is_empty())
        .unwrap_or_else(|| category.generic_kind());

    Ok(WorkflowNode {
        id: wire.id.clone(),
        kind: kind.to_owned(),
        position: wire.position,
        label: wire.data.label.clone(),
        config: wire.data.config.clone(),
    })
}

/// Editor → wire.
///
/// # Errors
/// [`MalformedNodeError`] if the id is empty or the position is not finite.
pub fn normalize(node: &WorkflowNode) -> Result<WireNode, MalformedNodeError> {
    check_addressable(&node.id, node.position)?;

    let category = category_for(node);
    let mut config = node.config.clone();
    if !catalog::is_generic(&node.kind) {
        config
            .entry(category.discriminator_key())
            .or_insert_with(|| Value::String(node.kind.clone()));
    }

    Ok(WireNode {
        id: node.id.clone(),
        node_type: category,
        position: node.position,
        data: WireNodeData {
            label: node.label.clone(),
            config,
        },
    })
}

/// Edges are shared between shapes; only empty handles are dropped.
pub fn normalize_edge(edge: &WorkflowEdge) -> WorkflowEdge {
    WorkflowEdge {
        source_handle: edge.source_handle.clone().filter(|h| !h.is_empty()),
        target_handle: edge.target_handle.clone().filter(|h| !h.is_empty()),
        ..edge.clone()
    }
}

/// Wire category for an editor node, falling back to LOGIC for unknown kinds.
pub fn category_for(node: &WorkflowNode) -> NodeCategory {
    resolve_category(node).unwrap_or_else(|| {
        warn!(node_id = %node.id, kind = %node.kind, "unknown node kind, defaulting to LOGIC");
        NodeCategory::Logic
    })
}

/// Category without the fallback: `None` if nothing identifies the kind.
///
/// A discriminator key in `config` whose value is the kind itself decides
/// first, since that is exactly what [`denormalize`] read the kind from. When
/// several categories' keys carry the kind, the catalog category wins if it is
/// among them, else the first in [`NodeCategory::ALL`] order. Kinds no key
/// identifies (generic kinds included) go to the catalog.
pub fn resolve_category(node: &WorkflowNode) -> Option<NodeCategory> {
    let matching: Vec<NodeCategory> = NodeCategory::ALL
        .into_iter()
        .filter(|category| {
            node.config
                .get(category.discriminator_key())
                .and_then(Value::as_str)
                == Some(node.kind.as_str())
        })
        .collect();

    let listed = catalog::category_of(&node.kind);
    match matching.as_slice() {
        [] => listed,
        [only] => Some(*only),
        [first, ..] => Some(listed.filter(|c| matching.contains(c)).unwrap_or(*first)),
    }
}

fn check_addressable(id: &str, position: Position) -> Result<(), MalformedNodeError> {
    if id.is_empty() {
        return Err(MalformedNodeError::EmptyId);
    }
    if !position.is_finite() {
        return Err(MalformedNodeError::NonFinitePosition { node_id: id.to_owned() });
    }
    Ok(())
}
