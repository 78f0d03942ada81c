//! Bug entity.
//!
//! A bug carries a large set of optional relational fields, descriptive
//! fields, and lifecycle actors. Each actor is present only when the matching
//! lifecycle event happened (a new bug has no resolver), and each raw
//! timestamp the UI shows travels with a display-formatted twin.

use super::time::format_display;
use super::user::User;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Status of a bug as a machine code plus a display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BugStatus {
    /// Status code, e.g. `active`, `resolved`, `closed`.
    pub code: String,
    /// Localized display name.
    pub name: String,
}

impl BugStatus {
    /// Code used when the backend sends a status the client cannot read.
    pub const UNKNOWN: &'static str = "unknown";
}

impl Default for BugStatus {
    fn default() -> Self {
        Self {
            code: Self::UNKNOWN.to_string(),
            name: Self::UNKNOWN.to_string(),
        }
    }
}

impl<'de> Deserialize<'de> for BugStatus {
    /// Accepts either `{"code", "name"}` or a bare status string, which the
    /// backend sends for some endpoints. A bare string becomes both fields.
    /// Any other shape decodes as [`BugStatus::UNKNOWN`] so one odd bug never
    /// fails a whole list.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(code) => Self {
                name: code.clone(),
                code,
            },
            Value::Object(fields) => {
                let code = fields
                    .get("code")
                    .and_then(Value::as_str)
                    .unwrap_or(Self::UNKNOWN)
                    .to_string();
                let name = fields
                    .get("name")
                    .and_then(Value::as_str)
                    .map_or_else(|| code.clone(), str::to_string);
                Self { code, name }
            }
            other => {
                tracing::debug!(status = %other, "unreadable bug status");
                Self::default()
            }
        })
    }
}

/// A bug as returned by the backend.
///
/// Severity and priority are small positive integers where 1 is the highest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bug {
    pub id: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_task: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_story: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub story: Option<u32>,

    pub title: String,
    #[serde(default)]
    pub keywords: String,
    pub severity: u8,
    pub pri: u8,
    #[serde(rename = "type", default)]
    pub bug_type: String,
    #[serde(default)]
    pub os: String,
    #[serde(default)]
    pub browser: String,
    /// Reproduction steps as HTML.
    #[serde(default)]
    pub steps: String,
    /// Steps with inline images rewritten for lazy loading through `get_image`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps_processed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opened_by: Option<User>,
    pub opened_date: String,
    #[serde(default)]
    pub opened_date_formatted: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_date_formatted: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_by: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_date_formatted: Option<String>,
    #[serde(
        default,
        alias = "resolved_build",
        skip_serializing_if = "Option::is_none"
    )]
    pub resolved_build: Option<String>,

    #[serde(default, alias = "closed_by", skip_serializing_if = "Option::is_none")]
    pub closed_by: Option<User>,
    #[serde(default, alias = "closed_date", skip_serializing_if = "Option::is_none")]
    pub closed_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_date_formatted: Option<String>,

    #[serde(default)]
    pub status: BugStatus,
}

impl Bug {
    /// Derives every display-formatted timestamp from its raw twin.
    ///
    /// Twins whose raw timestamp is absent are cleared, so a bug never shows
    /// a formatted time for an event that did not happen.
    #[must_use]
    pub fn with_display_times(mut self) -> Self {
        self.opened_date_formatted = format_display(&self.opened_date);
        self.assigned_date_formatted = self.assigned_date.as_deref().map(format_display);
        self.resolved_date_formatted = self.resolved_date.as_deref().map(format_display);
        self.closed_date_formatted = self.closed_date.as_deref().map(format_display);
        self
    }

    /// Whether the bug's status code is `closed`.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.status.code == "closed"
    }

    /// Whether the bug has been resolved, closed or not.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.resolved_by.is_some() || matches!(self.status.code.as_str(), "resolved" | "closed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend_bug() -> serde_json::Value {
        serde_json::json!({
            "id": 101,
            "product": 1,
            "branch": 0,
            "module": 4,
            "project": 0,
            "execution": 0,
            "toTask": 0,
            "toStory": 0,
            "title": "Crash when saving draft",
            "keywords": "",
            "severity": 1,
            "pri": 2,
            "type": "codeerror",
            "os": "",
            "browser": "",
            "steps": "<p>Open editor</p>",
            "openedBy": { "id": 3, "account": "qa", "avatar": "", "realname": "QA" },
            "openedDate": "2024-05-01T02:03:04Z",
            "openedDateFormatted": "2024-05-01 10:03:04",
            "status": "active"
        })
    }

    #[test]
    fn decodes_backend_shape_with_bare_status() {
        let bug: Bug = serde_json::from_value(backend_bug()).unwrap();

        assert_eq!(bug.id, 101);
        assert_eq!(bug.status.code, "active");
        assert_eq!(bug.status.name, "active");
        assert_eq!(bug.bug_type, "codeerror");
        assert!(bug.assigned_to.is_none());
        assert!(bug.resolved_by.is_none());
        assert!(bug.closed_by.is_none());
        assert!(!bug.is_resolved());
    }

    #[test]
    fn status_object_without_name_uses_code() {
        let mut raw = backend_bug();
        raw["status"] = serde_json::json!({ "code": "closed" });
        let bug: Bug = serde_json::from_value(raw).unwrap();

        assert_eq!(bug.status.name, "closed");
        assert!(bug.is_closed());
    }

    #[test]
    fn null_status_decodes_as_unknown() {
        let mut raw = backend_bug();
        raw["status"] = serde_json::Value::Null;
        let bug: Bug = serde_json::from_value(raw).unwrap();

        assert_eq!(bug.status, BugStatus::default());
        assert_eq!(bug.status.code, "unknown");
    }

    #[test]
    fn status_object_without_code_is_unknown() {
        let mut raw = backend_bug();
        raw["status"] = serde_json::json!({ "name": "Active" });
        let bug: Bug = serde_json::from_value(raw).unwrap();

        assert_eq!(bug.status.code, "unknown");
        assert_eq!(bug.status.name, "Active");
    }

    #[test]
    fn odd_status_does_not_fail_the_list() {
        let mut odd = backend_bug();
        odd["id"] = serde_json::json!(102);
        odd["status"] = serde_json::json!(3);
        let missing = {
            let mut raw = backend_bug();
            raw["id"] = serde_json::json!(103);
            raw.as_object_mut().unwrap().remove("status");
            raw
        };

        let bugs: Vec<Bug> =
            serde_json::from_value(serde_json::json!([backend_bug(), odd, missing])).unwrap();

        let codes: Vec<&str> = bugs.iter().map(|b| b.status.code.as_str()).collect();
        assert_eq!(codes, vec!["active", "unknown", "unknown"]);
    }

    #[test]
    fn accepts_snake_case_closed_fields() {
        let mut raw = backend_bug();
        raw["closed_by"] = serde_json::json!({ "id": 9, "account": "pm", "avatar": "", "realname": "PM" });
        raw["closed_date"] = serde_json::json!("2024-05-03T00:00:00Z");
        let bug: Bug = serde_json::from_value(raw).unwrap();

        assert_eq!(bug.closed_by.map(|u| u.id), Some(9));
        assert_eq!(bug.closed_date.as_deref(), Some("2024-05-03T00:00:00Z"));
    }

    #[test]
    fn display_times_follow_raw_times() {
        let mut bug: Bug = serde_json::from_value(backend_bug()).unwrap();
        bug.resolved_date = Some("2024-05-02T16:00:00Z".to_string());
        bug.closed_date_formatted = Some("stale".to_string());

        let bug = bug.with_display_times();

        assert_eq!(bug.opened_date_formatted, format_display(&bug.opened_date));
        assert_eq!(bug.resolved_date_formatted.as_deref(), Some("2024-05-03 00:00:00"));
        assert!(bug.assigned_date_formatted.is_none());
        assert!(bug.closed_date_formatted.is_none());
    }

    #[test]
    fn serializes_with_backend_field_names() {
        let bug: Bug = serde_json::from_value(backend_bug()).unwrap();
        let value = serde_json::to_value(&bug).unwrap();

        assert_eq!(value["toTask"], 0);
        assert_eq!(value["openedDateFormatted"], "2024-05-01 10:03:04");
        assert_eq!(value["type"], "codeerror");
        assert_eq!(value["status"]["code"], "active");
        assert!(value.get("assignedTo").is_none());
    }
}
