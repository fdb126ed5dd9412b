//! Expense repository contract and JSON-file implementation.
//!
//! # Responsibility
//! - Provide stable CRUD APIs over the persisted expense sequence.
//! - Keep on-disk format details inside the core persistence boundary.
//!
//! # Invariants
//! - After any successful mutating call, the backing file holds exactly the
//!   serialization of the in-memory sequence.
//! - Open never partially loads: a file that decodes at all decodes fully,
//!   or the open is aborted.

use crate::model::expense::{Expense, ExpenseDecodeError, ExpenseFields, ExpenseId};
use log::{debug, error, info, warn};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for expense persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Decode(ExpenseDecodeError),
    DuplicateTitle { title: String },
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Decode(err) => write!(f, "{err}"),
            Self::DuplicateTitle { title } => {
                write!(f, "an expense titled `{title}` already exists")
            }
            Self::Io(err) => write!(f, "expense store I/O failure: {err}"),
            Self::Json(err) => write!(f, "expense store encoding failure: {err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Decode(err) => Some(err),
            Self::DuplicateTitle { .. } => None,
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
        }
    }
}

impl From<ExpenseDecodeError> for RepoError {
    fn from(value: ExpenseDecodeError) -> Self {
        Self::Decode(value)
    }
}

impl From<std::io::Error> for RepoError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Repository interface for expense CRUD operations.
///
/// Lookup methods never fail; absence is `None` or an empty list.
pub trait ExpenseRepository {
    /// Appends a record and persists the whole sequence.
    ///
    /// With `enforce_unique_title`, fails with [`RepoError::DuplicateTitle`]
    /// when any held record's title matches case-insensitively; the sequence
    /// and the backing file are left untouched in that case.
    fn add(&mut self, expense: Expense, enforce_unique_title: bool) -> RepoResult<ExpenseId>;

    /// Removes the record with the given id, then persists regardless of
    /// whether anything matched. Returns whether the sequence shrank.
    fn remove(&mut self, id: ExpenseId) -> RepoResult<bool>;

    /// First record with the given id, in sequence order.
    fn find_by_id(&self, id: ExpenseId) -> Option<&Expense>;

    /// All records whose title matches case-insensitively, in sequence order.
    fn find_by_title(&self, title: &str) -> Vec<&Expense>;

    /// The live sequence, insertion order preserved.
    fn expenses(&self) -> &[Expense];
}

/// Expense repository backed by a single pretty-printed JSON file.
///
/// The whole sequence is loaded at open time and the whole file is
/// rewritten on every mutation; there are no incremental writes. There is
/// also no locking or versioning: two repositories opened on the same path
/// race, and the last persist wins.
#[derive(Debug)]
pub struct JsonExpenseRepository {
    path: PathBuf,
    expenses: Vec<Expense>,
}

impl JsonExpenseRepository {
    /// Opens a repository on `path`, loading any existing records.
    ///
    /// A missing file and a file that does not parse as the expected JSON
    /// structure both yield an empty repository; the two cases are
    /// distinguished only in the log stream (`reason=missing` at info,
    /// `reason=unparsable` at warn). An unparsable file is therefore
    /// replaced on the next mutation. A file that parses structurally but
    /// holds an undecodable record (negative amount, malformed id or
    /// timestamp) aborts the open instead.
    ///
    /// # Side effects
    /// - Emits `store_open` logging events with duration and status.
    pub fn open(path: impl Into<PathBuf>) -> RepoResult<Self> {
        let path = path.into();
        let started_at = Instant::now();
        info!(
            "event=store_open module=repo status=start path={}",
            path.display()
        );

        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    "event=store_open module=repo status=empty reason=missing duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                return Ok(Self {
                    path,
                    expenses: Vec::new(),
                });
            }
            Err(err) => {
                error!(
                    "event=store_open module=repo status=error error_code=store_read_failed duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(err.into());
            }
        };

        let all_fields: Vec<ExpenseFields> = match serde_json::from_str(&raw) {
            Ok(all_fields) => all_fields,
            Err(err) => {
                warn!(
                    "event=store_open module=repo status=recovered reason=unparsable duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                return Ok(Self {
                    path,
                    expenses: Vec::new(),
                });
            }
        };

        let mut expenses = Vec::with_capacity(all_fields.len());
        for fields in &all_fields {
            match Expense::from_fields(fields) {
                Ok(expense) => expenses.push(expense),
                Err(err) => {
                    error!(
                        "event=store_open module=repo status=error error_code=store_decode_failed duration_ms={} error={}",
                        started_at.elapsed().as_millis(),
                        err
                    );
                    return Err(err.into());
                }
            }
        }

        info!(
            "event=store_open module=repo status=ok count={} duration_ms={}",
            expenses.len(),
            started_at.elapsed().as_millis()
        );
        Ok(Self { path, expenses })
    }

    /// The backing file path fixed at open time.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rewrites the entire backing file from the in-memory sequence.
    ///
    /// Output is a JSON array of per-record field mappings, four-space
    /// indented, with stable key order per record.
    fn persist(&self) -> RepoResult<()> {
        let all_fields: Vec<ExpenseFields> =
            self.expenses.iter().map(Expense::to_fields).collect();

        let mut buf = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        all_fields.serialize(&mut serializer)?;

        std::fs::write(&self.path, &buf)?;
        debug!(
            "event=store_persist module=repo status=ok count={}",
            all_fields.len()
        );
        Ok(())
    }
}

impl ExpenseRepository for JsonExpenseRepository {
    fn add(&mut self, expense: Expense, enforce_unique_title: bool) -> RepoResult<ExpenseId> {
        if enforce_unique_title {
            let needle = expense.title.to_lowercase();
            if self
                .expenses
                .iter()
                .any(|held| held.title.to_lowercase() == needle)
            {
                return Err(RepoError::DuplicateTitle {
                    title: expense.title,
                });
            }
        }

        let id = expense.id;
        self.expenses.push(expense);
        self.persist()?;
        Ok(id)
    }

    fn remove(&mut self, id: ExpenseId) -> RepoResult<bool> {
        let initial_len = self.expenses.len();
        self.expenses.retain(|expense| expense.id != id);
        let removed = self.expenses.len() != initial_len;
        // Persist unconditionally: remove-of-absent still rewrites the file.
        self.persist()?;
        Ok(removed)
    }

    fn find_by_id(&self, id: ExpenseId) -> Option<&Expense> {
        self.expenses.iter().find(|expense| expense.id == id)
    }

    fn find_by_title(&self, title: &str) -> Vec<&Expense> {
        let needle = title.to_lowercase();
        self.expenses
            .iter()
            .filter(|expense| expense.title.to_lowercase() == needle)
            .collect()
    }

    fn expenses(&self) -> &[Expense] {
        &self.expenses
    }
}
