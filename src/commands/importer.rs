// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ingest::{self, IngestOutcome};
use crate::store::SqliteStore;
use crate::utils::current_user;
use anyhow::{Context, Result};
use rusqlite::Connection;
use std::fs::File;
use std::io::BufReader;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => {
            let outcome = import_transactions(conn, sub)?;
            print_outcome(&outcome, sub.get_flag("json"))
        }
        _ => Ok(()),
    }
}

/// Import the CSV at `--path` for `--user`. Row-level problems are reported in
/// the outcome; a missing column or a failed write is an error and leaves the
/// store untouched.
pub fn import_transactions(conn: &Connection, sub: &clap::ArgMatches) -> Result<IngestOutcome> {
    let path = sub.get_one::<String>("path").unwrap().trim();
    let store = SqliteStore::new(conn);
    let user = current_user(&store, sub)?;
    let file = File::open(path).with_context(|| format!("Open CSV {}", path))?;
    let outcome = ingest::ingest(&store, user.id, BufReader::new(file))
        .with_context(|| format!("Import {}", path))?;
    Ok(outcome)
}

fn print_outcome(outcome: &IngestOutcome, json_flag: bool) -> Result<()> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(outcome)?);
        return Ok(());
    }
    println!(
        "Successfully imported {} transactions",
        outcome.created_count
    );
    for err in &outcome.errors {
        println!("  {}", err);
    }
    Ok(())
}
