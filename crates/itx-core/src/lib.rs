//! itx-core: Core library for the itx issue tracker
//!
//! Provides the data model, the document store, and the issue service
//! behind the REST API. No schema migrations, no pagination - just
//! project-scoped CRUD over a JSONL document file.

pub mod config;
pub mod error;
pub mod id;
pub mod issue;
pub mod service;
pub mod store;

pub use config::Config;
pub use error::Error;
pub use issue::{Issue, IssueFilter, UpdateFields};
pub use service::{
    CreateIssue, CreateOutcome, DeleteIssue, DeleteOutcome, IssueService, UpdateIssue,
    UpdateOutcome,
};
pub use store::{DocumentStore, JsonlStore};

/// Result type for itx operations
pub type Result<T> = std::result::Result<T, Error>;
