//! The fixed lookup from editor kinds to wire categories.
//!
//! Kinds not listed here are still legal: triggers and actions are normally
//! supplied by a remote registry, so the editor has to cope with kinds it has
//! never seen. Callers decide how to categorise those.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::UnknownCategory;

// ---------------------------------------------------------------------------
// NodeCategory
// ---------------------------------------------------------------------------

/// The coarse node type understood by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeCategory {
    Trigger,
    Logic,
    Action,
}

impl NodeCategory {
    pub const ALL: [NodeCategory; 3] = [Self::Trigger, Self::Logic, Self::Action];

    /// Config key that carries the editor kind on the wire.
    pub fn discriminator_key(self) -> &'static str {
        match self {
            Self::Trigger => "triggerConfigId",
            Self::Logic => "subtype",
            Self::Action => "registryId",
        }
    }

    /// Kind used when the discriminator key is absent.
    pub fn generic_kind(self) -> &'static str {
        match self {
            Self::Trigger => "trigger",
            Self::Logic => "logic",
            Self::Action => "action",
        }
    }
}

impl fmt::Display for NodeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trigger => write!(f, "TRIGGER"),
            Self::Logic => write!(f, "LOGIC"),
            Self::Action => write!(f, "ACTION"),
        }
    }
}

impl FromStr for NodeCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TRIGGER" => Ok(Self::Trigger),
            "LOGIC" => Ok(Self::Logic),
            "ACTION" => Ok(Self::Action),
            other => Err(UnknownCategory(other.to_owned())),
        }
    }
}

// ---------------------------------------------------------------------------
// KindSpec
// ---------------------------------------------------------------------------

/// Static description of a built-in kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindSpec {
    pub kind: &'static str,
    pub category: NodeCategory,
    pub label: &'static str,
    /// Maximum number of incoming connections.
    pub inputs: usize,
    /// Number of output handles.
    pub outputs: usize,
    /// Config keys that must hold a non-blank value before publishing.
    pub required: &'static [&'static str],
}

impl KindSpec {
    const fn requires(self, required: &'static [&'static str]) -> Self {
        KindSpec { required, ..self }
    }
}

const fn spec(
    kind: &'static str,
    category: NodeCategory,
    label: &'static str,
    inputs: usize,
    outputs: usize,
) -> KindSpec {
    KindSpec { kind, category, label, inputs, outputs, required: &[] }
}

use NodeCategory::{Action, Logic, Trigger};

/// Every kind the editor knows natively.
pub static CATALOG: &[KindSpec] = &[
    // Triggers (editor names and registry trigger-config ids)
    spec("trigger", Trigger, "Trigger", 0, 1),
    spec("api-trigger", Trigger, "API Trigger", 0, 1).requires(&["path"]),
    spec("schedule-trigger", Trigger, "Schedule Trigger", 0, 1).requires(&["cron"]),
    spec("file-trigger", Trigger, "File Trigger", 0, 1).requires(&["acceptedFormats"]),
    spec("event-trigger", Trigger, "Event Trigger", 0, 1).requires(&["eventType", "topic"]),
    spec("api-call", Trigger, "API Call", 0, 1),
    spec("scheduler", Trigger, "Scheduler", 0, 1),
    spec("file", Trigger, "File", 0, 1),
    spec("event", Trigger, "Event", 0, 1),
    // Actions
    spec("action", Action, "Action", 1, 1),
    spec("send-email", Action, "Send Email", 1, 1).requires(&["recipients"]),
    spec("send-sms", Action, "Send SMS", 1, 1).requires(&["recipients"]),
    spec("send-push", Action, "Send Push", 1, 1).requires(&["recipients"]),
    spec("send-in-app", Action, "Send In-App", 1, 1).requires(&["recipients"]),
    spec("send-slack", Action, "Send Slack", 1, 1).requires(&["channel", "message"]),
    spec("send-discord", Action, "Send Discord", 1, 1).requires(&["channelId", "content"]),
    spec("send-teams", Action, "Send Teams", 1, 1).requires(&["title", "text"]),
    spec("send-webhook", Action, "Send Webhook", 1, 1).requires(&["url"]),
    // Logic
    spec("logic", Logic, "Logic", 1, 1),
    spec("ab-test", Logic, "A/B Test", 1, 2).requires(&["test_id"]),
    spec("condition", Logic, "Condition", 1, 2).requires(&["field", "operator"]),
    spec("switch", Logic, "Switch", 1, 3).requires(&["field"]),
    spec("loop", Logic, "Loop", 1, 1).requires(&["arrayField", "itemVariable"]),
    spec("delay", Logic, "Delay", 1, 1).requires(&["duration"]),
    spec("merge", Logic, "Merge", 2, 1),
    spec("wait-events", Logic, "Wait for Events", 1, 1),
];

/// Look up a built-in kind.
pub fn lookup(kind: &str) -> Option<&'static KindSpec> {
    CATALOG.iter().find(|spec| spec.kind == kind)
}

/// Category of a built-in kind, `None` for kinds outside the catalog.
pub fn category_of(kind: &str) -> Option<NodeCategory> {
    lookup(kind).map(|spec| spec.category)
}

/// All built-in kinds of one category, in catalog order.
pub fn kinds_in(category: NodeCategory) -> impl Iterator<Item = &'static KindSpec> {
    CATALOG.iter().filter(move |spec| spec.category == category)
}

/// `true` for the fallback kinds (`trigger`, `logic`, `action`).
pub fn is_generic(kind: &str) -> bool {
    NodeCategory::ALL.iter().any(|c| c.generic_kind() == kind)
}
