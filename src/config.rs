// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Persisted preferences, kept in the `settings` key/value table.

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;

use crate::aggregate::DEFAULT_TOP_N;

pub const DEFAULT_CURRENCY_SYMBOL: &str = "₹";

const CURRENCY_SYMBOL_KEY: &str = "currency_symbol";
const TOP_N_KEY: &str = "top_n";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    /// Prefix used when presenting money values.
    pub currency_symbol: String,
    /// How many top expenses and income sources reports rank by default.
    pub top_n: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
            top_n: DEFAULT_TOP_N,
        }
    }
}

fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key=?1",
            params![key],
            |r| r.get(0),
        )
        .optional()?;
    Ok(v)
}

fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}

impl Settings {
    pub fn load(conn: &Connection) -> Result<Self> {
        let defaults = Self::default();
        let currency_symbol =
            get_setting(conn, CURRENCY_SYMBOL_KEY)?.unwrap_or(defaults.currency_symbol);
        let top_n = match get_setting(conn, TOP_N_KEY)? {
            Some(raw) => raw
                .parse::<usize>()
                .with_context(|| format!("Invalid stored top_n '{}'", raw))?,
            None => defaults.top_n,
        };
        Ok(Self {
            currency_symbol,
            top_n,
        })
    }

    pub fn save(&self, conn: &Connection) -> Result<()> {
        set_setting(conn, CURRENCY_SYMBOL_KEY, &self.currency_symbol)?;
        set_setting(conn, TOP_N_KEY, &self.top_n.to_string())?;
        Ok(())
    }
}
