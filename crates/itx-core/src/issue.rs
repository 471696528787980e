//! Issue data model for itx
//!
//! One entity, scoped by project. The `_id` is assigned by the store;
//! everything else comes from the create request or the defaults here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A tracked work item scoped to a project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    /// Store-assigned identifier (24 hex chars), immutable
    #[serde(rename = "_id")]
    pub id: String,

    /// Project namespace, fixed at creation
    pub project: String,

    /// Issue title (required, non-empty)
    pub issue_title: String,

    /// Issue body text (required, non-empty)
    pub issue_text: String,

    /// Who opened the issue (required, non-empty)
    pub created_by: String,

    /// Assignee, empty when unassigned
    #[serde(default)]
    pub assigned_to: String,

    /// Free-form status note
    #[serde(default)]
    pub status_text: String,

    /// Open/closed flag
    pub open: bool,

    /// When the issue was created
    pub created_on: DateTime<Utc>,

    /// When the issue was last updated
    pub updated_on: DateTime<Utc>,
}

impl Issue {
    /// Build a fresh issue; the identifier is assigned by the store on insert
    pub fn new(
        project: String,
        issue_title: String,
        issue_text: String,
        created_by: String,
        assigned_to: String,
        status_text: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            project,
            issue_title,
            issue_text,
            created_by,
            assigned_to,
            status_text,
            open: true,
            created_on: now,
            updated_on: now,
        }
    }

    /// Exact-equality match for a single filter field
    ///
    /// `open` compares after a bool parse, timestamps after an RFC 3339
    /// parse; unknown field names never match.
    pub fn field_matches(&self, name: &str, value: &str) -> bool {
        match name {
            "_id" => self.id == value,
            "project" => self.project == value,
            "issue_title" => self.issue_title == value,
            "issue_text" => self.issue_text == value,
            "created_by" => self.created_by == value,
            "assigned_to" => self.assigned_to == value,
            "status_text" => self.status_text == value,
            "open" => value.parse::<bool>().is_ok_and(|v| v == self.open),
            "created_on" => value
                .parse::<DateTime<Utc>>()
                .is_ok_and(|t| t == self.created_on),
            "updated_on" => value
                .parse::<DateTime<Utc>>()
                .is_ok_and(|t| t == self.updated_on),
            _ => false,
        }
    }

    /// Apply a partial update and refresh `updated_on`
    pub fn apply(&mut self, fields: &UpdateFields) {
        if let Some(title) = &fields.issue_title {
            self.issue_title = title.clone();
        }
        if let Some(text) = &fields.issue_text {
            self.issue_text = text.clone();
        }
        if let Some(creator) = &fields.created_by {
            self.created_by = creator.clone();
        }
        if let Some(assignee) = &fields.assigned_to {
            self.assigned_to = assignee.clone();
        }
        if let Some(status) = &fields.status_text {
            self.status_text = status.clone();
        }
        if let Some(open) = fields.open {
            self.open = open;
        }
        self.updated_on = Utc::now();
    }
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] [{}] {}",
            self.id,
            self.project,
            if self.open { "open" } else { "closed" },
            self.issue_title
        )
    }
}

/// Equality filter over issues: a project plus field=value pairs, ANDed
#[derive(Debug, Clone)]
pub struct IssueFilter {
    /// Project namespace, always enforced
    pub project: String,
    /// Additional field filters, verbatim from the request
    pub fields: BTreeMap<String, String>,
}

impl IssueFilter {
    /// Filter matching every issue of a project
    pub fn project(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Force the project and take the remaining pairs as field filters
    ///
    /// A `project` key in the pairs is discarded; the path parameter wins.
    pub fn new(project: impl Into<String>, mut fields: BTreeMap<String, String>) -> Self {
        fields.remove("project");
        Self {
            project: project.into(),
            fields,
        }
    }

    /// Whether an issue satisfies every field of this filter
    pub fn matches(&self, issue: &Issue) -> bool {
        issue.project == self.project
            && self
                .fields
                .iter()
                .all(|(name, value)| issue.field_matches(name, value))
    }
}

/// Allow-listed partial update, built from a request body
///
/// Only these six fields are user-updatable; `project`, `_id` and the
/// timestamps never are.
#[derive(Debug, Clone, Default)]
pub struct UpdateFields {
    pub issue_title: Option<String>,
    pub issue_text: Option<String>,
    pub created_by: Option<String>,
    pub assigned_to: Option<String>,
    pub status_text: Option<String>,
    pub open: Option<bool>,
}

impl UpdateFields {
    /// Pick the allow-listed fields out of a raw body map
    ///
    /// Values outside the allow-list are dropped silently, as a strict
    /// document schema would.
    pub fn from_body(fields: &BTreeMap<String, serde_json::Value>) -> Self {
        let mut update = Self::default();
        for (name, value) in fields {
            match name.as_str() {
                "issue_title" => update.issue_title = as_string(value),
                "issue_text" => update.issue_text = as_string(value),
                "created_by" => update.created_by = as_string(value),
                "assigned_to" => update.assigned_to = as_string(value),
                "status_text" => update.status_text = as_string(value),
                "open" => update.open = as_bool(value),
                _ => {}
            }
        }
        update
    }
}

/// Coerce a JSON scalar to a field string
fn as_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// Coerce a JSON value to the open flag
fn as_bool(value: &serde_json::Value) -> Option<bool> {
    match value {
        serde_json::Value::Bool(b) => Some(*b),
        serde_json::Value::String(s) => s.parse().ok(),
        _ => None,
    }
}
