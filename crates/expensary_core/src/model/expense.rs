//! Expense domain model.
//!
//! # Responsibility
//! - Define the canonical expense record and its lifecycle helpers.
//! - Validate amounts at every path that can set one.
//! - Map records to and from the flat field shape stored on disk.
//!
//! # Invariants
//! - `id` is stable and never reused for another record.
//! - `amount >= 0.0` holds for every record handed out by this module.
//! - `created_at` is set once at construction and never changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for an expense record.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type ExpenseId = Uuid;

/// Canonical in-memory expense record.
///
/// Timestamps are kept as `DateTime<Utc>` internally and only rendered to
/// RFC 3339 strings at the persistence boundary via [`ExpenseFields`].
#[derive(Debug, Clone, PartialEq)]
pub struct Expense {
    /// Stable global ID used for lookup and removal.
    pub id: ExpenseId,
    /// Human-readable label. Not validated; may be empty.
    pub title: String,
    /// Non-negative monetary value.
    pub amount: f64,
    /// Set once at construction.
    pub created_at: DateTime<Utc>,
    /// Refreshed on every successful [`Expense::update`] call.
    pub updated_at: DateTime<Utc>,
}

/// Flat wire mapping for one persisted expense record.
///
/// This is exactly the per-record shape written to the backing file:
/// the id as a canonical hyphenated string and both timestamps as
/// RFC 3339 strings with explicit UTC offset. Field order here is the
/// stable key order in the serialized output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseFields {
    pub id: String,
    pub title: String,
    pub amount: f64,
    pub created_at: String,
    pub updated_at: String,
}

/// Validation failure for expense field values.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpenseValidationError {
    /// A negative amount was supplied to construction or update.
    NegativeAmount { amount: f64 },
}

impl Display for ExpenseValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NegativeAmount { amount } => {
                write!(f, "expense amount must be non-negative, got {amount}")
            }
        }
    }
}

impl Error for ExpenseValidationError {}

/// Failure while rebuilding an [`Expense`] from persisted fields.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpenseDecodeError {
    /// Persisted values failed the same checks as live construction.
    Validation(ExpenseValidationError),
    /// Stored id is not a parseable UUID.
    MalformedId { value: String },
    /// Stored timestamp is not parseable RFC 3339.
    MalformedTimestamp {
        field: &'static str,
        value: String,
    },
}

impl Display for ExpenseDecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::MalformedId { value } => write!(f, "malformed expense id `{value}`"),
            Self::MalformedTimestamp { field, value } => {
                write!(f, "malformed `{field}` timestamp `{value}`")
            }
        }
    }
}

impl Error for ExpenseDecodeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::MalformedId { .. } => None,
            Self::MalformedTimestamp { .. } => None,
        }
    }
}

impl From<ExpenseValidationError> for ExpenseDecodeError {
    fn from(value: ExpenseValidationError) -> Self {
        Self::Validation(value)
    }
}

impl Expense {
    /// Creates a new expense with a generated stable ID.
    ///
    /// # Contract
    /// - Rejects `amount < 0.0` with [`ExpenseValidationError::NegativeAmount`].
    /// - `created_at` and `updated_at` start equal, at the current UTC instant.
    /// - The title is stored as given; empty titles are accepted.
    pub fn new(
        title: impl Into<String>,
        amount: f64,
    ) -> Result<Self, ExpenseValidationError> {
        validate_amount(amount)?;
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            title: title.into(),
            amount,
            created_at: now,
            updated_at: now,
        })
    }

    /// Applies a partial in-place update.
    ///
    /// # Contract
    /// - A provided non-empty `title` replaces the current one; a provided
    ///   empty title is ignored.
    /// - A provided `amount` (including `0.0`, distinct from `None`) is
    ///   validated and then replaces the current one.
    /// - Title is applied before amount validation: when the amount is
    ///   rejected, an already-applied title change stays in place and
    ///   `updated_at` is left untouched.
    /// - `updated_at` is stamped on every call that returns `Ok`, even a
    ///   `(None, None)` no-op.
    pub fn update(
        &mut self,
        title: Option<&str>,
        amount: Option<f64>,
    ) -> Result<(), ExpenseValidationError> {
        if let Some(title) = title {
            if !title.is_empty() {
                self.title = title.to_string();
            }
        }
        if let Some(amount) = amount {
            validate_amount(amount)?;
            self.amount = amount;
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Renders this record into its flat persisted shape.
    pub fn to_fields(&self) -> ExpenseFields {
        ExpenseFields {
            id: self.id.to_string(),
            title: self.title.clone(),
            amount: self.amount,
            created_at: self.created_at.to_rfc3339(),
            updated_at: self.updated_at.to_rfc3339(),
        }
    }

    /// Rebuilds a record from its persisted shape.
    ///
    /// Routes the stored amount through the same non-negativity check as
    /// live construction, then restores id and both timestamps verbatim.
    ///
    /// # Errors
    /// - [`ExpenseDecodeError::Validation`] when the stored amount is negative.
    /// - [`ExpenseDecodeError::MalformedId`] when the stored id does not parse.
    /// - [`ExpenseDecodeError::MalformedTimestamp`] when a stored timestamp
    ///   does not parse.
    pub fn from_fields(fields: &ExpenseFields) -> Result<Self, ExpenseDecodeError> {
        let mut expense = Self::new(fields.title.as_str(), fields.amount)?;
        expense.id = Uuid::parse_str(&fields.id).map_err(|_| ExpenseDecodeError::MalformedId {
            value: fields.id.clone(),
        })?;
        expense.created_at = parse_timestamp("created_at", &fields.created_at)?;
        expense.updated_at = parse_timestamp("updated_at", &fields.updated_at)?;
        Ok(expense)
    }
}

fn validate_amount(amount: f64) -> Result<(), ExpenseValidationError> {
    if amount < 0.0 {
        return Err(ExpenseValidationError::NegativeAmount { amount });
    }
    Ok(())
}

fn parse_timestamp(
    field: &'static str,
    value: &str,
) -> Result<DateTime<Utc>, ExpenseDecodeError> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|_| ExpenseDecodeError::MalformedTimestamp {
            field,
            value: value.to_string(),
        })
}
