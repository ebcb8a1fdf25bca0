//! Graph validation — run this before publishing a workflow.
//!
//! Rules checked:
//! 1. Node IDs must be unique within the workflow.
//! 2. Every edge must reference existing nodes (both `source` and `target`).
//! 3. Exactly one trigger node.
//! 4. Every non-trigger node has at least one incoming edge.
//! 5. Cycles are reported as warnings: explicit loop nodes make them legal.
//! 6. Built-in kinds carry a label and the config keys their catalog entry
//!    requires; delay and merge also get their numeric bounds checked.
//!
//! Unlike the store's mutation API, nothing here changes the graph.

use std::collections::{HashMap, HashSet, VecDeque};

use nodes::{catalog, NodeCategory};
use serde_json::Value;

use crate::models::{WorkflowEdge, WorkflowNode};
use crate::normalize::resolve_category;
use crate::ConnectionRejected;

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Node the issue is attached to, if any.
    pub node_id: Option<String>,
    pub message: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// `true` when there are no errors. Warnings do not count.
    pub fn is_valid(&self) -> bool {
        !self.issues.iter().any(|i| i.severity == Severity::Error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Warning)
    }

    fn error(&mut self, node_id: Option<&str>, message: String) {
        self.issues.push(ValidationIssue {
            node_id: node_id.map(str::to_owned),
            message,
            severity: Severity::Error,
        });
    }

    fn warning(&mut self, node_id: Option<&str>, message: String) {
        self.issues.push(ValidationIssue {
            node_id: node_id.map(str::to_owned),
            message,
            severity: Severity::Warning,
        });
    }
}

fn is_trigger(node: &WorkflowNode) -> bool {
    resolve_category(node) == Some(NodeCategory::Trigger)
}

fn display_name(node: &WorkflowNode) -> &str {
    if node.label.is_empty() {
        &node.id
    } else {
        &node.label
    }
}

// ---------------------------------------------------------------------------
// Whole-graph validation
// ---------------------------------------------------------------------------

/// Check the graph and collect every problem found.
pub fn validate_workflow(nodes: &[WorkflowNode], edges: &[WorkflowEdge]) -> ValidationReport {
    let mut report = ValidationReport::default();

    // -----------------------------------------------------------------------
    // 1. Ensure node IDs are unique
    // -----------------------------------------------------------------------
    let mut seen_ids: HashSet<&str> = HashSet::new();
    for node in nodes {
        if !seen_ids.insert(node.id.as_str()) {
            report.error(Some(node.id.as_str()), format!("duplicate node ID '{}'", node.id));
        }
    }

    // -----------------------------------------------------------------------
    // 2. Validate edge endpoints
    // -----------------------------------------------------------------------
    for edge in edges {
        for (side, endpoint) in [("source", &edge.source), ("target", &edge.target)] {
            if !seen_ids.contains(endpoint.as_str()) {
                report.error(
                    None,
                    format!("edge '{}' references unknown node '{}' ({side} side)", edge.id, endpoint),
                );
            }
        }
    }

    // -----------------------------------------------------------------------
    // 3. Exactly one trigger
    // -----------------------------------------------------------------------
    let trigger_count = nodes.iter().filter(|n| is_trigger(n)).count();
    match trigger_count {
        0 => report.error(None, "workflow must have exactly one trigger node".into()),
        1 => {}
        n => report.error(
            None,
            format!("workflow can only have one trigger node, but found {n}"),
        ),
    }

    // -----------------------------------------------------------------------
    // 4. Every non-trigger node is reachable from somewhere
    // -----------------------------------------------------------------------
    let targets: HashSet<&str> = edges.iter().map(|e| e.target.as_str()).collect();
    for node in nodes.iter().filter(|n| !is_trigger(n)) {
        if !targets.contains(node.id.as_str()) {
            report.error(
                Some(node.id.as_str()),
                format!("node \"{}\" is not connected", display_name(node)),
            );
        }
    }

    // -----------------------------------------------------------------------
    // 5. Cycles
    // -----------------------------------------------------------------------
    for node_id in nodes_on_cycles(nodes, edges) {
        report.warning(
            Some(node_id),
            format!("node '{node_id}' is part of a cycle; make sure it is guarded by a loop node"),
        );
    }

    // -----------------------------------------------------------------------
    // 6. Per-node configuration
    // -----------------------------------------------------------------------
    for node in nodes {
        check_node_config(node, &mut report);
    }

    report
}

// ---------------------------------------------------------------------------
// Per-node configuration
// ---------------------------------------------------------------------------

/// Kinds outside the catalog are supplied by a registry and are not checked.
fn check_node_config(node: &WorkflowNode, report: &mut ValidationReport) {
    let Some(spec) = catalog::lookup(&node.kind) else {
        return;
    };
    let node_id = Some(node.id.as_str());

    if node.label.trim().is_empty() {
        report.error(node_id, format!("node \"{}\" must have a label", spec.label));
    }

    let missing: Vec<&str> = spec
        .required
        .iter()
        .copied()
        .filter(|key| is_blank(node.config.get(*key)))
        .collect();
    if !missing.is_empty() {
        report.error(
            node_id,
            format!("{} must have {}", spec.label, missing.join(" and ")),
        );
    }

    match spec.kind {
        "delay" => {
            let duration = node.config.get("duration").and_then(as_number);
            if duration.is_some_and(|d| d < 1.0) {
                report.error(node_id, "Delay must have a valid duration".into());
            }
        }
        "merge" => {
            let inputs = node
                .config
                .get("inputCount")
                .and_then(as_number)
                .filter(|n| *n != 0.0)
                .unwrap_or(2.0);
            if !(2.0..=10.0).contains(&inputs) {
                report.error(node_id, "Merge must have between 2 and 10 inputs".into());
            }
        }
        _ => {}
    }
}

/// Missing, null, `false`, zero and the empty string count as unset.
fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::Bool(b)) => !b,
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(_) | Value::Object(_)) => false,
    }
}

/// Numeric reading of a config value; `None` when it is not a number.
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// Nodes lying on a cycle, in input order.
///
/// Kahn's algorithm narrows the search to the nodes it cannot order.
///
/// Edges with unknown endpoints are ignored here; they are reported by the
/// endpoint check.
fn nodes_on_cycles<'a>(nodes: &'a [WorkflowNode], edges: &[WorkflowEdge]) -> Vec<&'a str> {
    // Build adjacency list and in-degree map.
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut in_degree: HashMap<&str, usize> = HashMap::new();

    for node in nodes {
        adjacency.entry(node.id.as_str()).or_default();
        in_degree.entry(node.id.as_str()).or_insert(0);
    }

    for edge in edges {
        if !in_degree.contains_key(edge.source.as_str())
            || !in_degree.contains_key(edge.target.as_str())
        {
            continue;
        }
        adjacency
            .entry(edge.source.as_str())
            .or_default()
            .push(edge.target.as_str());
        *in_degree.entry(edge.target.as_str()).or_insert(0) += 1;
    }

    // Seed the queue with nodes that have no incoming edges.
    let mut queue: VecDeque<&str> = in_degree
        .iter()
        .filter(|(_, &d)| d == 0)
        .map(|(&id, _)| id)
        .collect();

    let mut visited: HashSet<&str> = HashSet::with_capacity(nodes.len());

    while let Some(node_id) = queue.pop_front() {
        visited.insert(node_id);

        if let Some(neighbours) = adjacency.get(node_id) {
            for &neighbour in neighbours {
                let deg = in_degree.entry(neighbour).or_insert(0);
                *deg -= 1;
                if *deg == 0 {
                    queue.push_back(neighbour);
                }
            }
        }
    }

    // Anything left over sits on, or downstream of, a cycle. Keep only the
    // nodes that can reach themselves.
    let leftover: HashSet<&str> = in_degree
        .keys()
        .copied()
        .filter(|id| !visited.contains(id))
        .collect();

    let mut on_cycle: Vec<&str> = Vec::new();
    for node in nodes {
        let id = node.id.as_str();
        if leftover.contains(id)
            && !on_cycle.contains(&id)
            && reaches_itself(id, &adjacency, &leftover)
        {
            on_cycle.push(id);
        }
    }
    on_cycle
}

/// Depth-first search from `start`'s successors, staying inside `within`.
fn reaches_itself(
    start: &str,
    adjacency: &HashMap<&str, Vec<&str>>,
    within: &HashSet<&str>,
) -> bool {
    let mut stack: Vec<&str> = adjacency.get(start).cloned().unwrap_or_default();
    let mut seen: HashSet<&str> = HashSet::new();

    while let Some(id) = stack.pop() {
        if id == start {
            return true;
        }
        if !within.contains(id) || !seen.insert(id) {
            continue;
        }
        if let Some(next) = adjacency.get(id) {
            stack.extend(next.iter().copied());
        }
    }
    false
}

// ---------------------------------------------------------------------------
// Single connection
// ---------------------------------------------------------------------------

/// Decide whether `source → target` may be added to `edges`.
///
/// # Errors
/// - [`ConnectionRejected::TargetIsTrigger`] if `target` is a trigger.
/// - [`ConnectionRejected::Duplicate`] if the same pair is already connected.
/// - [`ConnectionRejected::InputLimit`] if `target` has no free input port.
pub fn validate_connection(
    source: &WorkflowNode,
    target: &WorkflowNode,
    edges: &[WorkflowEdge],
) -> Result<(), ConnectionRejected> {
    if is_trigger(target) {
        return Err(ConnectionRejected::TargetIsTrigger(target.id.clone()));
    }

    if edges.iter().any(|e| e.source == source.id && e.target == target.id) {
        return Err(ConnectionRejected::Duplicate {
            from: source.id.clone(),
            to: target.id.clone(),
        });
    }

    if let Some(spec) = catalog::lookup(&target.kind) {
        let existing = edges.iter().filter(|e| e.target == target.id).count();
        if existing >= spec.inputs {
            return Err(ConnectionRejected::InputLimit {
                node_id: target.id.clone(),
                limit: spec.inputs,
            });
        }
    }

    Ok(())
}
