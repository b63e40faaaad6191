// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use comfy_table::{Cell, Table, presets::UTF8_FULL};

use crate::ingest;
use crate::models::{DateRange, TransactionFilter, User};
use crate::store::UserStore;

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_amount(s: &str) -> Result<f64> {
    ingest::parse_amount(s).ok_or_else(|| anyhow!("Invalid amount '{}'", s))
}

/// Render `amount` as `<symbol><digits>.<2 decimals>` with thousands
/// separators, e.g. `-₹1,234.50`.
pub fn fmt_money(amount: f64, symbol: &str) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    // "-0.00" is not a useful thing to show.
    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}{}{}.{}", sign, symbol, grouped, frac_part)
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

/// Resolve the global `--user` argument to a registered user.
pub fn current_user<S: UserStore + ?Sized>(store: &S, m: &clap::ArgMatches) -> Result<User> {
    let login = m
        .get_one::<String>("user")
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .context("No user selected; pass --user or set FINTRACK_USER")?;
    store
        .find_user(login)?
        .with_context(|| format!("User '{}' not found", login))
}

/// Build the `--start/--end/--category` filter shared by listings and reports.
pub fn filter_from_args(m: &clap::ArgMatches) -> Result<TransactionFilter> {
    let start = m.get_one::<String>("start").map(|s| parse_date(s)).transpose()?;
    let end = m.get_one::<String>("end").map(|s| parse_date(s)).transpose()?;
    let range = DateRange::new(start, end)?;
    let category = m
        .get_one::<String>("category")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    Ok(TransactionFilter { range, category })
}
