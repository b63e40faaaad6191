// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Turns a [`Summary`] into the structures consumed by chart rendering, the
//! JSON summary, and the printable report.
//!
//! The assembler only borrows the summary. Formatting (currency symbol, two
//! decimals) and truncation happen here and nowhere earlier, so one summary can
//! feed every presentation unchanged.

use chrono::NaiveDate;
use serde::Serialize;

use crate::aggregate::{RankedTransaction, Summary};
use crate::models::Transaction;
use crate::utils::fmt_money;

/// Rows of the transaction listing embedded in a printable report.
pub const MAX_LISTED_TRANSACTIONS: usize = 50;
const DESCRIPTION_WIDTH: usize = 30;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

/// Unformatted chart inputs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    /// Income, expenses (as a negative bar), and net balance.
    pub overview: Series,
    /// Categories whose signed total is an outflow, as positive magnitudes.
    pub expense_categories: Series,
    /// Net amount per month, oldest first.
    pub monthly_net: Series,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub metric: String,
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryRow {
    pub category: String,
    pub total: String,
    pub count: usize,
    pub percentage: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingRow {
    pub date: String,
    pub category: String,
    pub amount: String,
    pub description: String,
}

/// The tables of a printable report, already formatted for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportDocument {
    pub title: String,
    pub generated_on: NaiveDate,
    pub summary: Vec<SummaryRow>,
    pub categories: Vec<CategoryRow>,
    pub top_expenses: Vec<ListingRow>,
    pub income_sources: Vec<ListingRow>,
    pub transactions: Vec<ListingRow>,
    /// `"<N> more transactions"` when the listing was cut short.
    pub truncated: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ReportAssembler {
    currency_symbol: String,
    listing_cap: usize,
}

impl ReportAssembler {
    pub fn new(currency_symbol: impl Into<String>) -> Self {
        Self {
            currency_symbol: currency_symbol.into(),
            listing_cap: MAX_LISTED_TRANSACTIONS,
        }
    }

    pub fn money(&self, amount: f64) -> String {
        fmt_money(amount, &self.currency_symbol)
    }

    pub fn chart_series(&self, summary: &Summary) -> ChartSeries {
        let t = &summary.totals;
        let (cat_labels, cat_values): (Vec<String>, Vec<f64>) = summary
            .category_breakdown
            .iter()
            .filter(|c| c.total < 0.0)
            .map(|c| (c.category.clone(), c.total.abs()))
            .unzip();
        let (month_labels, month_values): (Vec<String>, Vec<f64>) = summary
            .monthly_breakdown
            .iter()
            .map(|m| (m.month.clone(), m.net))
            .unzip();
        ChartSeries {
            overview: Series {
                labels: vec!["Income".into(), "Expenses".into(), "Net Balance".into()],
                values: vec![t.total_income, -t.total_expenses, t.net_balance],
            },
            expense_categories: Series {
                labels: cat_labels,
                values: cat_values,
            },
            monthly_net: Series {
                labels: month_labels,
                values: month_values,
            },
        }
    }

    /// The JSON report body. Numbers stay raw.
    pub fn json_summary(&self, summary: &Summary) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(summary)
    }

    /// Build the printable report. `transactions` is the snapshot the summary
    /// was computed from; it is listed newest first and capped.
    pub fn document(
        &self,
        summary: &Summary,
        transactions: &[Transaction],
        username: &str,
        generated_on: NaiveDate,
    ) -> ReportDocument {
        let t = &summary.totals;
        let summary_rows = vec![
            self.summary_row("Total Income", self.money(t.total_income)),
            self.summary_row("Total Expenses", self.money(t.total_expenses)),
            self.summary_row("Net Balance", self.money(t.net_balance)),
            self.summary_row("Total Transactions", t.transaction_count.to_string()),
        ];

        let mut by_name: Vec<_> = summary.category_breakdown.iter().collect();
        by_name.sort_by(|a, b| a.category.cmp(&b.category));
        let categories = by_name
            .into_iter()
            .map(|c| CategoryRow {
                category: c.category.clone(),
                total: self.money(c.total),
                count: c.count,
                percentage: format!("{:.1}%", c.percentage),
            })
            .collect();

        let mut newest_first: Vec<&Transaction> = transactions.iter().collect();
        newest_first.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        let hidden = newest_first.len().saturating_sub(self.listing_cap);
        let listing = newest_first
            .into_iter()
            .take(self.listing_cap)
            .map(|tx| ListingRow {
                date: tx.date.format("%Y-%m-%d").to_string(),
                category: tx.category.clone(),
                amount: self.money(tx.amount),
                description: shorten(&tx.description),
            })
            .collect();

        ReportDocument {
            title: format!("Financial Report for {}", username),
            generated_on,
            summary: summary_rows,
            categories,
            top_expenses: self.ranked_rows(&summary.top_expenses),
            income_sources: self.ranked_rows(&summary.income_sources),
            transactions: listing,
            truncated: (hidden > 0).then(|| format!("{} more transactions", hidden)),
        }
    }

    fn summary_row(&self, metric: &str, amount: String) -> SummaryRow {
        SummaryRow {
            metric: metric.to_string(),
            amount,
        }
    }

    fn ranked_rows(&self, ranked: &[RankedTransaction]) -> Vec<ListingRow> {
        ranked
            .iter()
            .map(|r| ListingRow {
                date: r.date.format("%Y-%m-%d").to_string(),
                category: r.category.clone(),
                amount: self.money(r.amount),
                description: shorten(&r.description),
            })
            .collect()
    }
}

fn shorten(description: &str) -> String {
    if description.chars().count() > DESCRIPTION_WIDTH {
        let head: String = description.chars().take(DESCRIPTION_WIDTH).collect();
        format!("{}...", head)
    } else {
        description.to_string()
    }
}
