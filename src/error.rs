// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Library error types.
//!
//! [`Error`] covers failures that abort an operation. [`RowParseError`] is the
//! per-row rejection produced during ingestion; it never aborts a batch and is
//! returned alongside the success count instead.

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

/// The errors that may abort a store, ingestion, or aggregation operation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The ingestion payload is missing one or more required columns.
    ///
    /// Raised before any row is looked at, so nothing is committed.
    #[error("payload must contain columns: date, category, amount (missing: {})", .missing.join(", "))]
    Schema { missing: Vec<String> },

    /// The underlying database rejected a read or write.
    ///
    /// For an ingestion batch this is fatal: the batch transaction is rolled
    /// back and no created count is reported.
    #[error("storage failure: {0}")]
    Storage(#[from] rusqlite::Error),

    /// A caller-supplied start date is later than the end date.
    #[error("start date {start} is after end date {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    /// The payload itself could not be read.
    #[error("could not read payload: {0}")]
    Payload(#[from] csv::Error),

    /// The requested record does not exist or belongs to another user.
    #[error("{0} not found")]
    NotFound(String),

    #[error("username '{0}' already exists")]
    DuplicateUsername(String),

    #[error("email '{0}' already exists")]
    DuplicateEmail(String),

    /// Passwords shorter than [`crate::password::MIN_PASSWORD_LENGTH`] are refused.
    #[error("password must be at least {0} characters long")]
    WeakPassword(usize),

    /// An unexpected error from the hashing library.
    #[error("hashing failed: {0}")]
    Hashing(String),
}

/// Why a single ingestion row was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RowFault {
    #[error("invalid date")]
    InvalidDate,
    #[error("invalid amount")]
    InvalidAmount,
    #[error("missing {0}")]
    MissingField(&'static str),
    #[error("unreadable row ({0})")]
    Unreadable(String),
}

/// A rejected ingestion row. `row` is 1-based and counts data rows in their
/// original order, header excluded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Row {row}: {fault}")]
pub struct RowParseError {
    pub row: usize,
    pub fault: RowFault,
}

impl Serialize for RowParseError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
