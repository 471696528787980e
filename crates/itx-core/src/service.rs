//! Issue service: the CRUD and query semantics behind the REST API
//!
//! Four operations against one store. Every operation checks store
//! readiness before looking at request data. Validation problems are
//! outcomes, not errors: the API reports them in a 200 body with an
//! `error` key, so they are modeled as enum variants rather than `Err`.

use crate::{DocumentStore, Error, Issue, IssueFilter, Result, UpdateFields, id};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::RwLock;

/// Create request body; `project` comes from the path, never from here
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateIssue {
    #[serde(default)]
    pub issue_title: Option<String>,
    #[serde(default)]
    pub issue_text: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub status_text: Option<String>,
}

/// Update request body: the target id plus whatever fields were sent
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateIssue {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(flatten)]
    pub fields: BTreeMap<String, serde_json::Value>,
}

/// Delete request body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeleteIssue {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
}

/// Outcome of a create request
#[derive(Debug)]
pub enum CreateOutcome {
    /// The full stored representation, id included
    Created(Issue),
    /// A required field was missing or empty; nothing was persisted
    MissingFields,
}

/// Outcome of an update request
///
/// `Failed` covers a structurally invalid id, a missing record and a
/// store failure alike; callers cannot tell them apart, by contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated(String),
    MissingId,
    NoFields(String),
    Failed(String),
}

/// Outcome of a delete request, with the same masking as update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted(String),
    MissingId,
    Failed(String),
}

/// The issue service: stateless request units over one shared store
///
/// Reads take the read lock, mutations the write lock; the store is the
/// sole point of serialization.
pub struct IssueService<S> {
    store: RwLock<S>,
}

impl<S: DocumentStore> IssueService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store: RwLock::new(store),
        }
    }

    /// Swap in a connected store once connectivity is established
    ///
    /// Readiness is set once and never reset afterwards.
    pub fn attach(&self, store: S) {
        *self.store.write().unwrap() = store;
    }

    /// Whether the underlying store is ready
    pub fn ready(&self) -> bool {
        self.store.read().unwrap().ready()
    }

    /// Create an issue under a project
    pub fn create(&self, project: &str, body: CreateIssue) -> Result<CreateOutcome> {
        let mut store = self.store.write().unwrap();
        if !store.ready() {
            return Err(Error::NotConnected);
        }

        let (Some(title), Some(text), Some(creator)) = (
            required(body.issue_title),
            required(body.issue_text),
            required(body.created_by),
        ) else {
            return Ok(CreateOutcome::MissingFields);
        };

        let issue = Issue::new(
            project.to_string(),
            title,
            text,
            creator,
            body.assigned_to.unwrap_or_default(),
            body.status_text.unwrap_or_default(),
        );
        let stored = store.insert_one(issue)?;
        Ok(CreateOutcome::Created(stored))
    }

    /// All issues of a project matching the given field filters
    pub fn query(&self, project: &str, filter: BTreeMap<String, String>) -> Result<Vec<Issue>> {
        let store = self.store.read().unwrap();
        if !store.ready() {
            return Err(Error::NotConnected);
        }
        store.find(&IssueFilter::new(project, filter))
    }

    /// Partially update an issue by id
    pub fn update(&self, body: UpdateIssue) -> Result<UpdateOutcome> {
        let mut store = self.store.write().unwrap();
        if !store.ready() {
            return Err(Error::NotConnected);
        }

        let Some(target) = required(body.id) else {
            return Ok(UpdateOutcome::MissingId);
        };
        if !id::is_valid(&target) {
            return Ok(UpdateOutcome::Failed(target));
        }

        // empty string means "not supplied", never "clear the field"
        let mut fields = body.fields;
        fields.retain(|_, value| value.as_str() != Some(""));
        if fields.is_empty() {
            return Ok(UpdateOutcome::NoFields(target));
        }

        match store.update_by_id(&target, &UpdateFields::from_body(&fields)) {
            Ok(true) => Ok(UpdateOutcome::Updated(target)),
            Ok(false) => Ok(UpdateOutcome::Failed(target)),
            Err(err) => {
                tracing::warn!("update of {} failed: {}", target, err);
                Ok(UpdateOutcome::Failed(target))
            }
        }
    }

    /// Hard-delete an issue by id
    pub fn delete(&self, body: DeleteIssue) -> Result<DeleteOutcome> {
        let mut store = self.store.write().unwrap();
        if !store.ready() {
            return Err(Error::NotConnected);
        }

        let Some(target) = required(body.id) else {
            return Ok(DeleteOutcome::MissingId);
        };
        if !id::is_valid(&target) {
            return Ok(DeleteOutcome::Failed(target));
        }

        match store.delete_by_id(&target) {
            Ok(true) => Ok(DeleteOutcome::Deleted(target)),
            Ok(false) => Ok(DeleteOutcome::Failed(target)),
            Err(err) => {
                tracing::warn!("delete of {} failed: {}", target, err);
                Ok(DeleteOutcome::Failed(target))
            }
        }
    }
}

/// Required-field check: present and non-empty
fn required(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}
