// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::password::PasswordHash;

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: PasswordHash,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: PasswordHash,
}

/// A persisted transaction. Positive amounts are income, negative amounts are
/// expenses, zero is neither.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    pub date: NaiveDate,
    pub category: String,
    pub amount: f64,
    pub description: String,
    pub created_at: NaiveDateTime,
}

/// A transaction that has been validated but not yet written to the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub user_id: i64,
    pub date: NaiveDate,
    pub category: String,
    pub amount: f64,
    pub description: String,
}

/// Replacement values for an existing transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionUpdate {
    pub date: NaiveDate,
    pub category: String,
    pub amount: f64,
    pub description: String,
}

impl From<&Transaction> for TransactionUpdate {
    fn from(t: &Transaction) -> Self {
        Self {
            date: t.date,
            category: t.category.clone(),
            amount: t.amount,
            description: t.description.clone(),
        }
    }
}

/// Inclusive date bounds. Either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
}

impl DateRange {
    /// # Errors
    ///
    /// Returns [`Error::InvalidRange`] when both bounds are given and `start`
    /// is later than `end`.
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Self, Error> {
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(Error::InvalidRange { start, end });
            }
        }
        Ok(Self { start, end })
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn start(&self) -> Option<NaiveDate> {
        self.start
    }

    pub fn end(&self) -> Option<NaiveDate> {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|s| date >= s) && self.end.is_none_or(|e| date <= e)
    }
}

/// Query-level filters accepted by listings and reports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    pub range: DateRange,
    /// Case-insensitive substring matched against the category.
    pub category: Option<String>,
}

impl TransactionFilter {
    pub fn matches(&self, t: &Transaction) -> bool {
        if !self.range.contains(t.date) {
            return false;
        }
        match self.category.as_deref() {
            None | Some("") => true,
            Some(needle) => t
                .category
                .to_lowercase()
                .contains(&needle.to_lowercase()),
        }
    }
}

/// Pagination for raw transaction listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: usize,
    pub offset: usize,
}

impl Page {
    pub const DEFAULT_LIMIT: usize = 100;
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: Self::DEFAULT_LIMIT,
            offset: 0,
        }
    }
}
