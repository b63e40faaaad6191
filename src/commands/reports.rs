// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::aggregate::{self, Summary};
use crate::config::Settings;
use crate::models::{Transaction, User};
use crate::report::{ListingRow, ReportAssembler, ReportDocument};
use crate::store::{SqliteStore, TransactionStore};
use crate::utils::{current_user, filter_from_args, maybe_print_json, pretty_table};
use anyhow::{Context, Result};
use rusqlite::Connection;
use std::fmt::Write as _;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("summary", sub)) => summary(conn, sub)?,
        Some(("charts", sub)) => charts(conn, sub)?,
        Some(("document", sub)) => document(conn, sub)?,
        _ => {}
    }
    Ok(())
}

/// Everything a report subcommand works from: the owner, the filtered
/// snapshot, its summary, and the presentation settings.
pub struct ReportInput {
    pub user: User,
    pub transactions: Vec<Transaction>,
    pub summary: Summary,
    pub settings: Settings,
}

pub fn load(conn: &Connection, sub: &clap::ArgMatches) -> Result<ReportInput> {
    let settings = Settings::load(conn)?;
    let store = SqliteStore::new(conn);
    let user = current_user(&store, sub)?;
    let filter = filter_from_args(sub)?;
    let n = sub
        .get_one::<usize>("limit")
        .copied()
        .unwrap_or(settings.top_n);
    let transactions = store.snapshot(user.id, &filter)?;
    let summary = aggregate::summarize(&transactions, n);
    Ok(ReportInput {
        user,
        transactions,
        summary,
        settings,
    })
}

fn summary(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let input = load(conn, sub)?;
    let assembler = ReportAssembler::new(&input.settings.currency_symbol);
    let json = assembler.json_summary(&input.summary)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &json)? {
        return Ok(());
    }

    let s = &input.summary;
    let t = &s.totals;
    println!(
        "{}",
        pretty_table(
            &["Metric", "Amount"],
            vec![
                vec!["Total Income".into(), assembler.money(t.total_income)],
                vec!["Total Expenses".into(), assembler.money(t.total_expenses)],
                vec!["Net Balance".into(), assembler.money(t.net_balance)],
                vec![
                    "Total Transactions".into(),
                    t.transaction_count.to_string()
                ],
            ],
        )
    );
    let categories = s
        .category_breakdown
        .iter()
        .map(|c| {
            vec![
                c.category.clone(),
                assembler.money(c.total),
                c.count.to_string(),
                format!("{:.1}%", c.percentage),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Category", "Total", "Count", "Share"], categories)
    );
    let months = s
        .monthly_breakdown
        .iter()
        .map(|m| {
            vec![
                m.month.clone(),
                assembler.money(m.income),
                assembler.money(m.expenses),
                assembler.money(m.net),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Month", "Income", "Expenses", "Net"], months)
    );
    Ok(())
}

fn charts(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let input = load(conn, sub)?;
    let assembler = ReportAssembler::new(&input.settings.currency_symbol);
    let series = assembler.chart_series(&input.summary);
    println!("{}", serde_json::to_string_pretty(&series)?);
    Ok(())
}

fn document(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let input = load(conn, sub)?;
    let assembler = ReportAssembler::new(&input.settings.currency_symbol);
    let today = chrono::Local::now().date_naive();
    let doc = assembler.document(
        &input.summary,
        &input.transactions,
        &input.user.username,
        today,
    );

    let body = if sub.get_flag("json") {
        serde_json::to_string_pretty(&doc)?
    } else {
        render_text(&doc)?
    };
    match sub.get_one::<String>("out") {
        Some(out) => {
            std::fs::write(out, body).with_context(|| format!("Write report to {}", out))?;
            println!("Wrote report to {}", out);
        }
        None => println!("{}", body),
    }
    Ok(())
}

fn listing_table(rows: &[ListingRow]) -> comfy_table::Table {
    let data = rows
        .iter()
        .map(|r| {
            vec![
                r.date.clone(),
                r.category.clone(),
                r.amount.clone(),
                r.description.clone(),
            ]
        })
        .collect();
    pretty_table(&["Date", "Category", "Amount", "Description"], data)
}

/// Plain-text rendering of the printable report.
pub fn render_text(doc: &ReportDocument) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "{}", doc.title)?;
    writeln!(out, "Generated on: {}", doc.generated_on.format("%B %d, %Y"))?;
    writeln!(out)?;

    writeln!(out, "Financial Summary")?;
    let summary = doc
        .summary
        .iter()
        .map(|r| vec![r.metric.clone(), r.amount.clone()])
        .collect();
    writeln!(out, "{}", pretty_table(&["Metric", "Amount"], summary))?;

    if doc.transactions.is_empty() {
        writeln!(out, "No transactions found.")?;
        return Ok(out);
    }

    writeln!(out, "Category Breakdown")?;
    let categories = doc
        .categories
        .iter()
        .map(|c| {
            vec![
                c.category.clone(),
                c.total.clone(),
                c.count.to_string(),
                c.percentage.clone(),
            ]
        })
        .collect();
    writeln!(
        out,
        "{}",
        pretty_table(
            &["Category", "Total Amount", "Transaction Count", "Share"],
            categories
        )
    )?;

    if !doc.top_expenses.is_empty() {
        writeln!(out, "Top Expenses")?;
        writeln!(out, "{}", listing_table(&doc.top_expenses))?;
    }
    if !doc.income_sources.is_empty() {
        writeln!(out, "Income Sources")?;
        writeln!(out, "{}", listing_table(&doc.income_sources))?;
    }

    writeln!(out, "Transaction Details")?;
    writeln!(out, "{}", listing_table(&doc.transactions))?;
    if let Some(more) = &doc.truncated {
        writeln!(out, "... ({})", more)?;
    }
    Ok(out)
}
