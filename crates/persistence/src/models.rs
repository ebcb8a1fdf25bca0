//! Stored shapes.
//!
//! These are *persistence* models — they carry no editing behaviour.
//! Editor and wire node types live in the `graph` crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status assigned to newly created workflows.
pub const INITIAL_STATUS: &str = "draft";

// ---------------------------------------------------------------------------
// WorkflowRecord
// ---------------------------------------------------------------------------

/// A persisted workflow definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowRecord {
    pub id: Uuid,
    pub name: String,
    /// Lifecycle status (`draft`, `active`, ...), kept outside the definition.
    pub status: String,
    /// Full JSON workflow definition (name, description, nodes, edges).
    pub definition: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkflowRecord {
    pub fn new(name: impl Into<String>, definition: serde_json::Value) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            status: INITIAL_STATUS.to_owned(),
            definition,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the definition, picking up a non-empty `name` from it.
    pub fn apply_definition(&mut self, definition: serde_json::Value) {
        if let Some(name) = definition.get("name").and_then(|n| n.as_str()) {
            if !name.is_empty() {
                self.name = name.to_owned();
            }
        }
        self.definition = definition;
        self.updated_at = Utc::now();
    }

    pub fn ack(&self) -> SaveAck {
        SaveAck { id: self.id, updated_at: self.updated_at }
    }
}

// ---------------------------------------------------------------------------
// SaveAck
// ---------------------------------------------------------------------------

/// Acknowledgement returned by a successful write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveAck {
    pub id: Uuid,
    pub updated_at: DateTime<Utc>,
}
