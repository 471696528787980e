//! JSONL document store for itx issues
//!
//! One JSON document per line. Records keep insertion order, which is the
//! natural order queries return. Each record carries a `_rev` bookkeeping
//! counter that never leaves the store.

use crate::{Error, Issue, IssueFilter, Result, UpdateFields, id};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Per-record persistent collaborator behind the issue service
///
/// Insert assigns the identifier; find/update/delete are keyed by it.
/// `ready` is the connectivity flag every operation is guarded on.
pub trait DocumentStore {
    /// Whether the store is connected and usable
    fn ready(&self) -> bool;

    /// Persist a new issue, assigning its identifier
    fn insert_one(&mut self, issue: Issue) -> Result<Issue>;

    /// All issues matching the filter, in natural order
    fn find(&self, filter: &IssueFilter) -> Result<Vec<Issue>>;

    /// Apply a partial update to the record with this id; false when absent
    fn update_by_id(&mut self, id: &str, fields: &UpdateFields) -> Result<bool>;

    /// Hard-delete the record with this id; false when absent
    fn delete_by_id(&mut self, id: &str) -> Result<bool>;
}

/// A stored document: the issue plus store-internal bookkeeping
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Record {
    #[serde(flatten)]
    issue: Issue,
    /// Revision counter, bumped on every update; stripped from results
    #[serde(rename = "_rev", default)]
    rev: u64,
}

/// JSONL-backed issue store
pub struct JsonlStore {
    path: PathBuf,
    ready: bool,
    records: Vec<Record>,
}

impl JsonlStore {
    /// Open (or create) the store at the given path
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut store = Self {
            path,
            ready: true,
            records: Vec::new(),
        };
        store.load()?;
        Ok(store)
    }

    /// A placeholder store that is never ready
    ///
    /// Lets the server start before (or without) a usable store; every
    /// request then fails fast with the not-connected condition.
    pub fn disconnected() -> Self {
        Self {
            path: PathBuf::new(),
            ready: false,
            records: Vec::new(),
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&mut self) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }

        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: Record = serde_json::from_str(&line)?;
            self.records.push(record);
        }

        Ok(())
    }

    fn save(&self) -> Result<()> {
        let file = File::create(&self.path)?;
        let mut writer = BufWriter::new(file);

        for record in &self.records {
            serde_json::to_writer(&mut writer, record)?;
            writeln!(writer)?;
        }

        writer.flush()?;
        Ok(())
    }

    fn guard(&self) -> Result<()> {
        if self.ready { Ok(()) } else { Err(Error::NotConnected) }
    }
}

impl DocumentStore for JsonlStore {
    fn ready(&self) -> bool {
        self.ready
    }

    fn insert_one(&mut self, mut issue: Issue) -> Result<Issue> {
        self.guard()?;
        issue.id = id::generate_id();
        self.records.push(Record {
            issue: issue.clone(),
            rev: 0,
        });
        self.save()?;
        Ok(issue)
    }

    fn find(&self, filter: &IssueFilter) -> Result<Vec<Issue>> {
        self.guard()?;
        Ok(self
            .records
            .iter()
            .filter(|r| filter.matches(&r.issue))
            .map(|r| r.issue.clone())
            .collect())
    }

    fn update_by_id(&mut self, id: &str, fields: &UpdateFields) -> Result<bool> {
        self.guard()?;
        let Some(record) = self.records.iter_mut().find(|r| r.issue.id == id) else {
            return Ok(false);
        };
        record.issue.apply(fields);
        record.rev += 1;
        self.save()?;
        Ok(true)
    }

    fn delete_by_id(&mut self, id: &str) -> Result<bool> {
        self.guard()?;
        let before = self.records.len();
        self.records.retain(|r| r.issue.id != id);
        if self.records.len() == before {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }
}
