// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Bulk import of tabular transaction data.
//!
//! A payload is checked for the required columns first; if any are missing
//! the whole upload is refused. Otherwise every row is converted on its own:
//! bad rows are recorded with their 1-based position and skipped, good rows are
//! collected and committed together in one atomic write.

use std::io::Read;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, Trim};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::{Error, RowFault, RowParseError};
use crate::models::NewTransaction;
use crate::store::TransactionStore;

pub const REQUIRED_COLUMNS: [&str; 3] = ["date", "category", "amount"];
pub const DESCRIPTION_COLUMN: &str = "description";

/// Date-only formats, tried in order after ISO `YYYY-MM-DD`.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%b-%Y", "%d %b %Y", "%b %d, %Y", "%B %d, %Y", "%Y%m%d",
];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// The result of converting a payload, before anything touches the store.
#[derive(Debug, Default)]
pub struct ParsedBatch {
    pub accepted: Vec<NewTransaction>,
    pub rejected: Vec<RowParseError>,
}

/// What the caller is told after a committed upload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestOutcome {
    pub created_count: usize,
    pub errors: Vec<RowParseError>,
}

struct ColumnMap {
    date: usize,
    category: usize,
    amount: usize,
    description: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &StringRecord) -> Result<Self, Error> {
        let position = |name: &str| headers.iter().position(|h| h == name);
        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|c| position(c).is_none())
            .map(|c| c.to_string())
            .collect();
        match (position("date"), position("category"), position("amount")) {
            (Some(date), Some(category), Some(amount)) => Ok(Self {
                date,
                category,
                amount,
                description: position(DESCRIPTION_COLUMN),
            }),
            _ => Err(Error::Schema { missing }),
        }
    }
}

/// Parse a calendar date in any of the accepted textual formats.
pub fn parse_flexible_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(raw, f).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

/// Parse a signed decimal amount. Infinities and NaN are not decimals and are
/// refused.
///
/// Values outside `Decimal`'s range or scale (`1e30`, `1e-30`) fall back to a
/// plain float parse of the same numeric text.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    let unsigned = raw.strip_prefix('+').unwrap_or(raw);
    Decimal::from_str(unsigned)
        .or_else(|_| Decimal::from_scientific(unsigned))
        .ok()
        .and_then(|d| d.to_f64())
        .or_else(|| parse_wide_amount(unsigned))
}

fn parse_wide_amount(raw: &str) -> Option<f64> {
    let numeric = raw
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));
    if !numeric {
        return None;
    }
    raw.parse::<f64>().ok().filter(|a| a.is_finite())
}

fn convert_row(
    record: &StringRecord,
    columns: &ColumnMap,
    user_id: i64,
) -> Result<NewTransaction, RowFault> {
    let field = |idx: usize| record.get(idx).filter(|s| !s.is_empty());

    let date_raw = field(columns.date).ok_or(RowFault::MissingField("date"))?;
    let date = parse_flexible_date(date_raw).ok_or(RowFault::InvalidDate)?;

    let amount_raw = field(columns.amount).ok_or(RowFault::MissingField("amount"))?;
    let amount = parse_amount(amount_raw).ok_or(RowFault::InvalidAmount)?;

    let category = field(columns.category).ok_or(RowFault::MissingField("category"))?;
    let description = columns
        .description
        .and_then(|idx| record.get(idx))
        .unwrap_or_default();

    Ok(NewTransaction {
        user_id,
        date,
        category: category.to_string(),
        amount,
        description: description.to_string(),
    })
}

/// Convert a CSV payload into candidate transactions for `user_id`.
///
/// # Errors
///
/// [`Error::Schema`] if the header lacks a required column, or
/// [`Error::Payload`] if the payload cannot be read at all. Individual bad
/// rows never produce an error here; they land in [`ParsedBatch::rejected`].
pub fn parse_payload<R: Read>(reader: R, user_id: i64) -> Result<ParsedBatch, Error> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let columns = ColumnMap::from_headers(rdr.headers()?)?;
    let mut batch = ParsedBatch::default();

    for (idx, result) in rdr.records().enumerate() {
        let row = idx + 1;
        let converted = match result {
            Ok(record) => convert_row(&record, &columns, user_id),
            Err(err) => match err.kind() {
                csv::ErrorKind::Utf8 { .. } => Err(RowFault::Unreadable(err.to_string())),
                _ => return Err(err.into()),
            },
        };
        match converted {
            Ok(t) => batch.accepted.push(t),
            Err(fault) => {
                tracing::debug!(row, %fault, "rejected row");
                batch.rejected.push(RowParseError { row, fault });
            }
        }
    }
    Ok(batch)
}

/// Parse `reader` and commit every valid row for `user_id` as one batch.
///
/// # Errors
///
/// [`Error::Schema`] and [`Error::Payload`] as for [`parse_payload`], and
/// [`Error::Storage`] if the batch write fails, in which case nothing was
/// committed.
pub fn ingest<S, R>(store: &S, user_id: i64, reader: R) -> Result<IngestOutcome, Error>
where
    S: TransactionStore + ?Sized,
    R: Read,
{
    let ParsedBatch { accepted, rejected } = parse_payload(reader, user_id)?;
    let created_count = store.insert_batch(&accepted)?;
    tracing::info!(
        user_id,
        created = created_count,
        rejected = rejected.len(),
        "ingested transaction batch"
    );
    Ok(IngestOutcome {
        created_count,
        errors: rejected,
    })
}
