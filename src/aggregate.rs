// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Totals, breakdowns, and rankings over a snapshot of transactions.
//!
//! Everything here is a pure function of its input slice. Values are plain
//! `f64` sums in the ledger's currency unit; no rounding happens here, so a
//! [`Summary`] can always be re-derived from the same transactions.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::models::Transaction;

pub const DEFAULT_TOP_N: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Totals {
    pub total_income: f64,
    pub total_expenses: f64,
    pub net_balance: f64,
    pub transaction_count: usize,
}

impl Totals {
    /// Total money moved in either direction; the denominator for category
    /// percentages.
    pub fn gross(&self) -> f64 {
        self.total_income + self.total_expenses
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub category: String,
    /// Signed sum of the category's amounts.
    pub total: f64,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySummary {
    /// `YYYY-MM`
    pub month: String,
    pub income: f64,
    pub expenses: f64,
    pub net: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedTransaction {
    pub date: NaiveDate,
    pub category: String,
    /// Absolute value for expenses, as recorded for income.
    pub amount: f64,
    pub description: String,
}

/// Everything the dashboard, JSON report, and printable report are built from.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    #[serde(flatten)]
    pub totals: Totals,
    pub category_breakdown: Vec<CategorySummary>,
    pub monthly_breakdown: Vec<MonthlySummary>,
    pub top_expenses: Vec<RankedTransaction>,
    pub income_sources: Vec<RankedTransaction>,
}

pub fn totals(transactions: &[Transaction]) -> Totals {
    let (income, expenses) = split_flows(transactions.iter().map(|t| t.amount));
    Totals {
        total_income: income,
        total_expenses: expenses,
        net_balance: income - expenses,
        transaction_count: transactions.len(),
    }
}

/// Sum positive amounts and the magnitude of negative amounts separately.
fn split_flows(amounts: impl Iterator<Item = f64>) -> (f64, f64) {
    amounts.fold((0.0, 0.0), |(inc, exp), a| {
        if a > 0.0 {
            (inc + a, exp)
        } else if a < 0.0 {
            (inc, exp + a.abs())
        } else {
            (inc, exp)
        }
    })
}

/// Per-category signed totals in order of first appearance.
///
/// `percentage` is `|total|` over `totals.gross()`, or 0 when nothing moved.
/// Callers that need a stable order must sort the result themselves.
pub fn category_breakdown(transactions: &[Transaction], totals: &Totals) -> Vec<CategorySummary> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut out: Vec<CategorySummary> = Vec::new();
    for t in transactions {
        let slot = *index.entry(t.category.as_str()).or_insert_with(|| {
            out.push(CategorySummary {
                category: t.category.clone(),
                total: 0.0,
                count: 0,
                percentage: 0.0,
            });
            out.len() - 1
        });
        out[slot].total += t.amount;
        out[slot].count += 1;
    }

    let gross = totals.gross();
    for c in &mut out {
        c.percentage = if gross > 0.0 {
            c.total.abs() / gross * 100.0
        } else {
            0.0
        };
    }
    out
}

/// Income, expenses, and net per calendar month, oldest month first.
pub fn monthly_breakdown(transactions: &[Transaction]) -> Vec<MonthlySummary> {
    let mut months: BTreeMap<(i32, u32), Vec<f64>> = BTreeMap::new();
    for t in transactions {
        months
            .entry((t.date.year(), t.date.month()))
            .or_default()
            .push(t.amount);
    }
    months
        .into_iter()
        .map(|((year, month), amounts)| {
            let (income, expenses) = split_flows(amounts.into_iter());
            MonthlySummary {
                month: format!("{:04}-{:02}", year, month),
                income,
                expenses,
                net: income - expenses,
            }
        })
        .collect()
}

/// The `n` largest expenses by magnitude. Equal amounts keep input order.
pub fn top_expenses(transactions: &[Transaction], n: usize) -> Vec<RankedTransaction> {
    rank(transactions, n, |a| a < 0.0)
        .into_iter()
        .map(|t| ranked(t, t.amount.abs()))
        .collect()
}

/// The `n` largest income transactions. Equal amounts keep input order.
pub fn income_sources(transactions: &[Transaction], n: usize) -> Vec<RankedTransaction> {
    rank(transactions, n, |a| a > 0.0)
        .into_iter()
        .map(|t| ranked(t, t.amount))
        .collect()
}

fn rank(transactions: &[Transaction], n: usize, keep: impl Fn(f64) -> bool) -> Vec<&Transaction> {
    let mut picked: Vec<&Transaction> = transactions.iter().filter(|t| keep(t.amount)).collect();
    // `sort_by` is stable, which is what breaks ties by input order.
    picked.sort_by(|a, b| b.amount.abs().total_cmp(&a.amount.abs()));
    picked.truncate(n);
    picked
}

fn ranked(t: &Transaction, amount: f64) -> RankedTransaction {
    RankedTransaction {
        date: t.date,
        category: t.category.clone(),
        amount,
        description: t.description.clone(),
    }
}

/// Compute every aggregate for `transactions`, ranking the top `n` expenses and
/// income sources. Empty input gives zero totals and empty lists.
pub fn summarize(transactions: &[Transaction], n: usize) -> Summary {
    let totals = totals(transactions);
    let summary = Summary {
        category_breakdown: category_breakdown(transactions, &totals),
        monthly_breakdown: monthly_breakdown(transactions),
        top_expenses: top_expenses(transactions, n),
        income_sources: income_sources(transactions, n),
        totals,
    };
    tracing::debug!(
        transactions = transactions.len(),
        categories = summary.category_breakdown.len(),
        months = summary.monthly_breakdown.len(),
        "summarized transactions"
    );
    summary
}
