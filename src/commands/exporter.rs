// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::TransactionFilter;
use crate::store::{SqliteStore, TransactionStore};
use crate::utils::current_user;
use anyhow::{Result, bail};
use rusqlite::Connection;
use serde_json::json;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(conn, sub),
        _ => Ok(()),
    }
}

/// Write the user's transactions oldest first. The CSV layout is the one the
/// importer reads, so an export can be imported again.
fn export_transactions(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();
    if fmt != "csv" && fmt != "json" {
        bail!("Unknown format: {} (use csv|json)", fmt);
    }

    let store = SqliteStore::new(conn);
    let user = current_user(&store, sub)?;
    let rows = store.snapshot(user.id, &TransactionFilter::default())?;

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record(["date", "category", "amount", "description"])?;
            for t in &rows {
                wtr.write_record([
                    t.date.format("%Y-%m-%d").to_string(),
                    t.category.clone(),
                    t.amount.to_string(),
                    t.description.clone(),
                ])?;
            }
            wtr.flush()?;
        }
        _ => {
            let items: Vec<_> = rows
                .iter()
                .map(|t| {
                    json!({
                        "id": t.id,
                        "date": t.date.format("%Y-%m-%d").to_string(),
                        "category": t.category,
                        "amount": t.amount,
                        "description": t.description,
                        "created_at": t.created_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
                    })
                })
                .collect();
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
    }
    tracing::info!(rows = rows.len(), format = %fmt, "exported transactions");
    println!("Exported {} transactions to {}", rows.len(), out);
    Ok(())
}
