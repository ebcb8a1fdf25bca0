//! Copy/paste of node selections.
//!
//! A copy keeps the selected nodes with positions relative to the selection's
//! top-left corner, plus only the edges running between selected nodes.
//! Pasting mints fresh ids so the result can be appended to any graph.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Position, WorkflowEdge, WorkflowNode};

/// A detached selection, ready to paste.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CopiedNodes {
    pub nodes: Vec<WorkflowNode>,
    pub edges: Vec<WorkflowEdge>,
    /// Top-left corner of the selection in the source graph.
    pub origin: Position,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PasteOptions {
    /// Where the selection's top-left corner lands.
    pub offset: Position,
}

impl Default for PasteOptions {
    fn default() -> Self {
        Self { offset: Position::new(50.0, 50.0) }
    }
}

/// Copy the nodes named in `selected` and the edges between them.
///
/// Returns `None` if nothing in `selected` exists in `nodes`.
pub fn copy_nodes<S: AsRef<str>>(
    nodes: &[WorkflowNode],
    edges: &[WorkflowEdge],
    selected: &[S],
) -> Option<CopiedNodes> {
    let wanted: HashSet<&str> = selected.iter().map(AsRef::as_ref).collect();
    let picked: Vec<&WorkflowNode> = nodes.iter().filter(|n| wanted.contains(n.id.as_str())).collect();
    if picked.is_empty() {
        return None;
    }

    let origin = Position::new(
        picked.iter().map(|n| n.position.x).fold(f64::INFINITY, f64::min),
        picked.iter().map(|n| n.position.y).fold(f64::INFINITY, f64::min),
    );

    let copied_nodes = picked
        .into_iter()
        .map(|n| WorkflowNode {
            position: Position::new(n.position.x - origin.x, n.position.y - origin.y),
            ..n.clone()
        })
        .collect();

    let copied_edges = edges
        .iter()
        .filter(|e| wanted.contains(e.source.as_str()) && wanted.contains(e.target.as_str()))
        .cloned()
        .collect();

    Some(CopiedNodes {
        nodes: copied_nodes,
        edges: copied_edges,
        origin,
    })
}

/// Produce fresh nodes and edges from a copy. Internal edges are rewired to
/// the new ids.
pub fn paste_nodes(
    copied: &CopiedNodes,
    options: &PasteOptions,
) -> (Vec<WorkflowNode>, Vec<WorkflowEdge>) {
    let mut id_map: HashMap<&str, String> = HashMap::with_capacity(copied.nodes.len());

    let nodes = copied
        .nodes
        .iter()
        .map(|n| {
            let new_id = format!("{}-{}", n.id, Uuid::new_v4().simple());
            id_map.insert(n.id.as_str(), new_id.clone());
            WorkflowNode {
                id: new_id,
                position: Position::new(
                    n.position.x + options.offset.x,
                    n.position.y + options.offset.y,
                ),
                ..n.clone()
            }
        })
        .collect();

    let edges = copied
        .edges
        .iter()
        .filter_map(|e| {
            let source = id_map.get(e.source.as_str())?.clone();
            let target = id_map.get(e.target.as_str())?.clone();
            Some(WorkflowEdge {
                id: format!("edge-{}", Uuid::new_v4().simple()),
                source,
                target,
                ..e.clone()
            })
        })
        .collect();

    (nodes, edges)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Vec<WorkflowNode>, Vec<WorkflowEdge>) {
        let nodes = vec![
            WorkflowNode::new("a", "condition", Position::new(100.0, 200.0)),
            WorkflowNode::new("b", "send-sms", Position::new(300.0, 150.0)),
            WorkflowNode::new("c", "send-email", Position::new(500.0, 500.0)),
        ];
        let edges = vec![
            WorkflowEdge::new("ab", "a", "b").with_source_handle("true"),
            WorkflowEdge::new("bc", "b", "c"),
        ];
        (nodes, edges)
    }

    #[test]
    fn copy_keeps_only_internal_edges_and_relative_positions() {
        let (nodes, edges) = sample();
        let copied = copy_nodes(&nodes, &edges, &["a", "b"]).expect("selection exists");

        assert_eq!(copied.origin, Position::new(100.0, 150.0));
        assert_eq!(copied.nodes.len(), 2);
        assert_eq!(copied.nodes[0].position, Position::new(0.0, 50.0));
        assert_eq!(copied.nodes[1].position, Position::new(200.0, 0.0));
        assert_eq!(copied.edges.len(), 1);
        assert_eq!(copied.edges[0].id, "ab");
    }

    #[test]
    fn empty_selection_copies_nothing() {
        let (nodes, edges) = sample();
        assert!(copy_nodes::<&str>(&nodes, &edges, &[]).is_none());
        assert!(copy_nodes(&nodes, &edges, &["zzz"]).is_none());
    }

    #[test]
    fn paste_mints_ids_and_rewires_edges() {
        let (nodes, edges) = sample();
        let copied = copy_nodes(&nodes, &edges, &["a", "b"]).unwrap();
        let (pasted_nodes, pasted_edges) = paste_nodes(&copied, &PasteOptions::default());

        assert!(pasted_nodes.iter().all(|n| n.id != "a" && n.id != "b"));
        assert_eq!(pasted_nodes[0].position, Position::new(50.0, 100.0));

        let edge = &pasted_edges[0];
        assert_eq!(edge.source, pasted_nodes[0].id);
        assert_eq!(edge.target, pasted_nodes[1].id);
        assert_eq!(edge.source_handle.as_deref(), Some("true"));
    }

    #[test]
    fn pasting_twice_never_reuses_ids() {
        let (nodes, edges) = sample();
        let copied = copy_nodes(&nodes, &edges, &["a"]).unwrap();
        let (first, _) = paste_nodes(&copied, &PasteOptions::default());
        let (second, _) = paste_nodes(&copied, &PasteOptions::default());
        assert_ne!(first[0].id, second[0].id);
    }
}
