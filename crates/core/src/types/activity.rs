//! Audit trail entries from `GET /api/admin/activity`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityDetails {
    #[serde(default)]
    pub body: Option<Map<String, Value>>,
    #[serde(default)]
    pub params: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    #[serde(default)]
    pub admin_name: String,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub formatted_date: String,
    #[serde(default)]
    pub formatted_time: String,
    #[serde(default)]
    pub details: Option<ActivityDetails>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Render a detail value for a table cell: objects as JSON with single quotes.
#[must_use]
pub fn detail_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Object(_) | Value::Array(_) => value.to_string().replace('"', "'"),
        Value::Bool(_) | Value::Number(_) => value.to_string(),
    }
}

fn describe(map: Option<&Map<String, Value>>) -> Option<String> {
    let map = map.filter(|m| !m.is_empty())?;
    Some(
        map.iter()
            .map(|(key, value)| format!("{key}: {}", detail_value(value)))
            .collect::<Vec<_>>()
            .join("; "),
    )
}

impl ActivityLog {
    /// `key: value` pairs from body and params, joined `"; "` within a group
    /// and `" | "` between groups.
    #[must_use]
    pub fn changes(&self) -> String {
        let Some(details) = &self.details else {
            return String::new();
        };
        [
            describe(details.body.as_ref()),
            describe(details.params.as_ref()),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" | ")
    }

    /// Detail pairs for the table view, body first.
    #[must_use]
    pub fn detail_pairs(&self) -> Vec<(String, String)> {
        let Some(details) = &self.details else {
            return Vec::new();
        };
        details
            .body
            .iter()
            .chain(details.params.iter())
            .flat_map(|map| map.iter())
            .map(|(k, v)| (k.clone(), detail_value(v)))
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_changes_joins_groups() {
        let log: ActivityLog = serde_json::from_str(
            r#"{"adminName":"Mila","action":"UPDATE_ORDER",
                "details":{"body":{"status":"received"},"params":{"id":"o1"}}}"#,
        )
        .unwrap();
        assert_eq!(log.changes(), "status: received | id: o1");
        assert_eq!(log.detail_pairs().len(), 2);
    }

    #[test]
    fn test_detail_value_single_quotes_objects() {
        let value = serde_json::json!({"by": "x"});
        assert_eq!(detail_value(&value), "{'by':'x'}");
        assert_eq!(detail_value(&Value::Null), "");
        assert_eq!(detail_value(&serde_json::json!(3)), "3");
    }

    #[test]
    fn test_changes_without_details() {
        let log: ActivityLog = serde_json::from_str(r#"{"action":"LOGIN"}"#).unwrap();
        assert_eq!(log.changes(), "");
        let only_params: ActivityLog =
            serde_json::from_str(r#"{"details":{"body":{},"params":{"id":"p9"}}}"#).unwrap();
        assert_eq!(only_params.changes(), "id: p9");
    }
}
