//! Typed view over a node's open config map.
//!
//! The config map travels untyped on the wire and in the editor. Forms that
//! want typed access decode it here; keys a variant does not interpret (or
//! values of an unexpected JSON type) stay in `extra`, so encoding again
//! reproduces the original map.

use serde_json::{Map, Value};

type Config = Map<String, Value>;

/// Per-kind settings decoded from a node's config.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeSettings {
    /// Cron-driven trigger.
    Schedule {
        cron: Option<String>,
        timezone: Option<String>,
        extra: Config,
    },
    /// Anything that issues an HTTP request.
    Http {
        method: Option<String>,
        url: Option<String>,
        headers: Option<Config>,
        extra: Config,
    },
    /// Two-way branch on an expression.
    Condition {
        expression: Option<String>,
        true_label: Option<String>,
        false_label: Option<String>,
        extra: Config,
    },
    Delay {
        duration: Option<u64>,
        extra: Config,
    },
    /// A kind without a typed view.
    Other { extra: Config },
}

impl NodeSettings {
    /// Decode `config` for `kind`. Never fails.
    pub fn decode(kind: &str, config: &Config) -> Self {
        let mut extra = config.clone();
        match kind {
            "schedule-trigger" | "scheduler" => Self::Schedule {
                cron: take_string(&mut extra, "cron"),
                timezone: take_string(&mut extra, "timezone"),
                extra,
            },
            "send-webhook" | "api-call" | "api-trigger" => Self::Http {
                method: take_string(&mut extra, "method"),
                url: take_string(&mut extra, "url"),
                headers: take_object(&mut extra, "headers"),
                extra,
            },
            "condition" => Self::Condition {
                expression: take_string(&mut extra, "expression"),
                true_label: take_string(&mut extra, "trueLabel"),
                false_label: take_string(&mut extra, "falseLabel"),
                extra,
            },
            "delay" => Self::Delay {
                duration: take_u64(&mut extra, "duration"),
                extra,
            },
            _ => Self::Other { extra },
        }
    }

    /// Re-encode into a config map.
    pub fn encode(self) -> Config {
        match self {
            Self::Schedule { cron, timezone, mut extra } => {
                put(&mut extra, "cron", cron.map(Value::String));
                put(&mut extra, "timezone", timezone.map(Value::String));
                extra
            }
            Self::Http { method, url, headers, mut extra } => {
                put(&mut extra, "method", method.map(Value::String));
                put(&mut extra, "url", url.map(Value::String));
                put(&mut extra, "headers", headers.map(Value::Object));
                extra
            }
            Self::Condition { expression, true_label, false_label, mut extra } => {
                put(&mut extra, "expression", expression.map(Value::String));
                put(&mut extra, "trueLabel", true_label.map(Value::String));
                put(&mut extra, "falseLabel", false_label.map(Value::String));
                extra
            }
            Self::Delay { duration, mut extra } => {
                put(&mut extra, "duration", duration.map(Value::from));
                extra
            }
            Self::Other { extra } => extra,
        }
    }

    /// Keys this view does not interpret.
    pub fn extra(&self) -> &Config {
        match self {
            Self::Schedule { extra, .. }
            | Self::Http { extra, .. }
            | Self::Condition { extra, .. }
            | Self::Delay { extra, .. }
            | Self::Other { extra } => extra,
        }
    }
}

fn take_string(map: &mut Config, key: &str) -> Option<String> {
    match map.get(key) {
        Some(Value::String(_)) => match map.remove(key) {
            Some(Value::String(s)) => Some(s),
            _ => None,
        },
        _ => None,
    }
}

fn take_object(map: &mut Config, key: &str) -> Option<Config> {
    match map.get(key) {
        Some(Value::Object(_)) => match map.remove(key) {
            Some(Value::Object(o)) => Some(o),
            _ => None,
        },
        _ => None,
    }
}

fn take_u64(map: &mut Config, key: &str) -> Option<u64> {
    let value = map.get(key)?.as_u64()?;
    map.remove(key);
    Some(value)
}

fn put(map: &mut Config, key: &str, value: Option<Value>) {
    if let Some(value) = value {
        map.insert(key.to_owned(), value);
    }
}

// ============================================================
// Unit tests
// ============================================================
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(value: Value) -> Config {
        match value {
            Value::Object(map) => map,
            _ => panic!("fixture must be an object"),
        }
    }

    #[test]
    fn schedule_trigger_decodes_cron() {
        let cfg = config(json!({ "triggerConfigId": "scheduler", "cron": "0 9 * * *" }));
        let settings = NodeSettings::decode("schedule-trigger", &cfg);

        match &settings {
            NodeSettings::Schedule { cron, timezone, extra } => {
                assert_eq!(cron.as_deref(), Some("0 9 * * *"));
                assert_eq!(timezone, &None);
                assert_eq!(extra.get("triggerConfigId"), Some(&json!("scheduler")));
            }
            other => panic!("expected schedule settings, got {other:?}"),
        }
        assert_eq!(settings.encode(), cfg);
    }

    #[test]
    fn webhook_keeps_unknown_keys_in_extra() {
        let cfg = config(json!({
            "registryId": "send-webhook",
            "method": "POST",
            "url": "https://example.test/hook",
            "headers": { "X-Token": "abc" },
            "retryPolicy": { "attempts": 3 }
        }));
        let settings = NodeSettings::decode("send-webhook", &cfg);

        assert!(settings.extra().contains_key("retryPolicy"));
        assert!(!settings.extra().contains_key("url"));
        assert_eq!(settings.encode(), cfg);
    }

    #[test]
    fn mistyped_values_are_left_untouched() {
        let cfg = config(json!({ "subtype": "delay", "duration": "five minutes" }));
        let settings = NodeSettings::decode("delay", &cfg);

        assert_eq!(
            settings,
            NodeSettings::Delay { duration: None, extra: cfg.clone() }
        );
        assert_eq!(settings.encode(), cfg);
    }

    #[test]
    fn unknown_kind_decodes_to_other() {
        let cfg = config(json!({ "registryId": "crm-sync", "objectTypeId": 12 }));
        let settings = NodeSettings::decode("crm-sync", &cfg);
        assert_eq!(settings, NodeSettings::Other { extra: cfg.clone() });
    }

    #[test]
    fn condition_labels_are_decoded() {
        let cfg = config(json!({
            "subtype": "condition",
            "expression": "user.age > 18",
            "trueLabel": "adult",
            "falseLabel": "minor"
        }));
        let settings = NodeSettings::decode("condition", &cfg);
        match &settings {
            NodeSettings::Condition { expression, true_label, false_label, .. } => {
                assert_eq!(expression.as_deref(), Some("user.age > 18"));
                assert_eq!(true_label.as_deref(), Some("adult"));
                assert_eq!(false_label.as_deref(), Some("minor"));
            }
            other => panic!("expected condition settings, got {other:?}"),
        }
        assert_eq!(settings.encode(), cfg);
    }
}
