// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::Settings;
use crate::models::{NewTransaction, Page, Transaction, TransactionUpdate};
use crate::store::{SqliteStore, TransactionStore};
use crate::utils::{
    current_user, filter_from_args, fmt_money, maybe_print_json, parse_amount, parse_date,
    pretty_table,
};
use anyhow::{Result, bail};
use rusqlite::Connection;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let store = SqliteStore::new(conn);
    match m.subcommand() {
        Some(("add", sub)) => add(&store, sub)?,
        Some(("list", sub)) => list(conn, &store, sub)?,
        Some(("show", sub)) => show(conn, &store, sub)?,
        Some(("edit", sub)) => edit(&store, sub)?,
        Some(("rm", sub)) => rm(&store, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(store: &SqliteStore<'_>, sub: &clap::ArgMatches) -> Result<()> {
    let user = current_user(store, sub)?;
    let date = parse_date(sub.get_one::<String>("date").unwrap())?;
    let category = sub.get_one::<String>("category").unwrap().trim();
    let amount = parse_amount(sub.get_one::<String>("amount").unwrap())?;
    let description = sub
        .get_one::<String>("description")
        .map(|s| s.trim().to_string())
        .unwrap_or_default();
    if category.is_empty() {
        bail!("Category must not be empty");
    }

    let t = store.create_transaction(&NewTransaction {
        user_id: user.id,
        date,
        category: category.to_string(),
        amount,
        description,
    })?;
    println!(
        "Recorded #{} {} on {} in '{}'",
        t.id, t.amount, t.date, t.category
    );
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct TransactionRow {
    pub id: i64,
    pub date: String,
    pub category: String,
    pub amount: f64,
    pub description: String,
    pub created_at: String,
}

impl From<&Transaction> for TransactionRow {
    fn from(t: &Transaction) -> Self {
        Self {
            id: t.id,
            date: t.date.format("%Y-%m-%d").to_string(),
            category: t.category.clone(),
            amount: t.amount,
            description: t.description.clone(),
            created_at: t.created_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
        }
    }
}

fn table_rows(data: &[TransactionRow], symbol: &str) -> Vec<Vec<String>> {
    data.iter()
        .map(|r| {
            vec![
                r.id.to_string(),
                r.date.clone(),
                r.category.clone(),
                fmt_money(r.amount, symbol),
                r.description.clone(),
            ]
        })
        .collect()
}

const HEADERS: [&str; 5] = ["ID", "Date", "Category", "Amount", "Description"];

fn list(conn: &Connection, store: &SqliteStore<'_>, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(store, sub)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let symbol = Settings::load(conn)?.currency_symbol;
        println!("{}", pretty_table(&HEADERS, table_rows(&data, &symbol)));
    }
    Ok(())
}

/// The raw listing for `--user`, newest first, filtered and paginated by the
/// `list` arguments.
pub fn query_rows(store: &SqliteStore<'_>, sub: &clap::ArgMatches) -> Result<Vec<TransactionRow>> {
    let user = current_user(store, sub)?;
    let filter = filter_from_args(sub)?;
    let page = Page {
        limit: sub
            .get_one::<usize>("limit")
            .copied()
            .unwrap_or(Page::DEFAULT_LIMIT),
        offset: sub.get_one::<usize>("offset").copied().unwrap_or(0),
    };
    let rows = store.list_transactions(user.id, &filter, page)?;
    Ok(rows.iter().map(TransactionRow::from).collect())
}

fn show(conn: &Connection, store: &SqliteStore<'_>, sub: &clap::ArgMatches) -> Result<()> {
    let user = current_user(store, sub)?;
    let id = *sub.get_one::<i64>("id").unwrap();
    let row = TransactionRow::from(&store.get_transaction(user.id, id)?);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &row)? {
        let symbol = Settings::load(conn)?.currency_symbol;
        println!("{}", pretty_table(&HEADERS, table_rows(&[row], &symbol)));
    }
    Ok(())
}

fn edit(store: &SqliteStore<'_>, sub: &clap::ArgMatches) -> Result<()> {
    let user = current_user(store, sub)?;
    let id = *sub.get_one::<i64>("id").unwrap();
    let existing = store.get_transaction(user.id, id)?;

    let mut update = TransactionUpdate::from(&existing);
    if let Some(d) = sub.get_one::<String>("date") {
        update.date = parse_date(d)?;
    }
    if let Some(c) = sub.get_one::<String>("category") {
        let c = c.trim();
        if c.is_empty() {
            bail!("Category must not be empty");
        }
        update.category = c.to_string();
    }
    if let Some(a) = sub.get_one::<String>("amount") {
        update.amount = parse_amount(a)?;
    }
    if let Some(d) = sub.get_one::<String>("description") {
        update.description = d.trim().to_string();
    }

    let t = store.update_transaction(user.id, id, &update)?;
    println!(
        "Updated #{}: {} on {} in '{}'",
        t.id, t.amount, t.date, t.category
    );
    Ok(())
}

fn rm(store: &SqliteStore<'_>, sub: &clap::ArgMatches) -> Result<()> {
    let user = current_user(store, sub)?;
    let id = *sub.get_one::<i64>("id").unwrap();
    store.delete_transaction(user.id, id)?;
    println!("Removed transaction #{}", id);
    Ok(())
}
