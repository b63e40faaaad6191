// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use fintrack::aggregate::{self, MonthlySummary, Summary};
use fintrack::error::Error;
use fintrack::models::{DateRange, Transaction, TransactionFilter};

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn tx(id: i64, d: &str, category: &str, amount: f64, description: &str) -> Transaction {
    Transaction {
        id,
        user_id: 1,
        date: date(d),
        category: category.into(),
        amount,
        description: description.into(),
        created_at: date(d).and_hms_opt(0, 0, 0).unwrap(),
    }
}

fn sample() -> Vec<Transaction> {
    vec![
        tx(1, "2024-02-01", "Salary", 3000.0, "feb pay"),
        tx(2, "2024-01-10", "Food", -120.0, "groceries"),
        tx(3, "2024-01-15", "Rent", -900.0, "jan rent"),
        tx(4, "2024-02-03", "Food", -80.0, "dinner"),
        tx(5, "2024-01-01", "Salary", 3000.0, "jan pay"),
        tx(6, "2024-03-01", "Refund", 0.0, "zero"),
    ]
}

#[test]
fn empty_input_is_all_zero() {
    let summary = aggregate::summarize(&[], 10);
    assert_eq!(summary, Summary::default());
    assert_eq!(summary.totals.transaction_count, 0);
    assert!(summary.category_breakdown.is_empty());
    assert!(summary.monthly_breakdown.is_empty());
}

#[test]
fn totals_split_by_sign_and_ignore_zero() {
    let t = aggregate::totals(&sample());
    assert_eq!(t.total_income, 6000.0);
    assert_eq!(t.total_expenses, 1100.0);
    assert_eq!(t.net_balance, 4900.0);
    assert_eq!(t.transaction_count, 6);
}

#[test]
fn category_breakdown_keeps_first_occurrence_order() {
    let rows = sample();
    let totals = aggregate::totals(&rows);
    let cats = aggregate::category_breakdown(&rows, &totals);
    let names: Vec<&str> = cats.iter().map(|c| c.category.as_str()).collect();
    assert_eq!(names, vec!["Salary", "Food", "Rent", "Refund"]);

    let food = &cats[1];
    assert_eq!(food.total, -200.0);
    assert_eq!(food.count, 2);
    assert!((food.percentage - 200.0 / 7100.0 * 100.0).abs() < 1e-9);

    assert_eq!(cats[3].percentage, 0.0);
    let signed: f64 = cats.iter().map(|c| c.total).sum();
    assert_eq!(signed, totals.net_balance);
}

#[test]
fn percentages_are_zero_when_nothing_moved() {
    let rows = vec![tx(1, "2024-01-01", "Noop", 0.0, "")];
    let summary = aggregate::summarize(&rows, 10);
    assert_eq!(summary.category_breakdown[0].percentage, 0.0);
    assert_eq!(summary.category_breakdown[0].count, 1);
}

#[test]
fn percentage_uses_income_plus_expenses_of_the_input() {
    let rows = vec![
        tx(1, "2024-01-01", "Salary", 1000.0, ""),
        tx(2, "2024-01-02", "Food", -250.0, ""),
    ];
    let summary = aggregate::summarize(&rows, 10);
    assert_eq!(summary.category_breakdown[0].percentage, 80.0);
    assert_eq!(summary.category_breakdown[1].percentage, 20.0);
}

#[test]
fn same_month_income_and_expense() {
    let rows = vec![
        tx(1, "2024-05-02", "Salary", 1000.0, ""),
        tx(2, "2024-05-20", "Food", -300.0, ""),
    ];
    assert_eq!(
        aggregate::monthly_breakdown(&rows),
        vec![MonthlySummary {
            month: "2024-05".into(),
            income: 1000.0,
            expenses: 300.0,
            net: 700.0,
        }]
    );
}

#[test]
fn monthly_breakdown_is_chronological_regardless_of_input_order() {
    let months: Vec<String> = aggregate::monthly_breakdown(&sample())
        .into_iter()
        .map(|m| m.month)
        .collect();
    assert_eq!(months, vec!["2024-01", "2024-02", "2024-03"]);

    let across_years = vec![
        tx(1, "2025-01-01", "A", 1.0, ""),
        tx(2, "2023-12-31", "A", 1.0, ""),
        tx(3, "2024-11-30", "A", 1.0, ""),
    ];
    let months: Vec<String> = aggregate::monthly_breakdown(&across_years)
        .into_iter()
        .map(|m| m.month)
        .collect();
    assert_eq!(months, vec!["2023-12", "2024-11", "2025-01"]);
}

#[test]
fn top_expenses_are_absolute_sorted_and_stable() {
    let rows = vec![
        tx(1, "2024-01-01", "A", -50.0, "first fifty"),
        tx(2, "2024-01-02", "B", -75.0, "big"),
        tx(3, "2024-01-03", "C", 10.0, "income"),
        tx(4, "2024-01-04", "D", -50.0, "second fifty"),
        tx(5, "2024-01-05", "E", -5.0, "small"),
    ];
    let top = aggregate::top_expenses(&rows, 3);
    let described: Vec<(&str, f64)> = top
        .iter()
        .map(|r| (r.description.as_str(), r.amount))
        .collect();
    assert_eq!(
        described,
        vec![("big", 75.0), ("first fifty", 50.0), ("second fifty", 50.0)]
    );

    assert_eq!(aggregate::top_expenses(&rows, 10).len(), 4);
    assert!(aggregate::top_expenses(&rows, 0).is_empty());
}

#[test]
fn income_sources_rank_positive_amounts_only() {
    let incomes = aggregate::income_sources(&sample(), 10);
    assert_eq!(incomes.len(), 2);
    assert_eq!(incomes[0].description, "feb pay");
    assert_eq!(incomes[1].description, "jan pay");
    assert!(incomes.iter().all(|r| r.amount == 3000.0));
}

#[test]
fn summarize_does_not_touch_its_input() {
    let rows = sample();
    let before = rows.clone();
    let _ = aggregate::summarize(&rows, 2);
    assert_eq!(rows, before);
}

#[test]
fn summary_serializes_to_report_shape() {
    let rows = vec![
        tx(1, "2024-01-01", "Salary", 50000.0, "pay"),
        tx(2, "2024-01-05", "Food", -500.0, "lunch"),
    ];
    let value = serde_json::to_value(aggregate::summarize(&rows, 10)).unwrap();
    assert_eq!(value["total_income"], 50000.0);
    assert_eq!(value["total_expenses"], 500.0);
    assert_eq!(value["net_balance"], 49500.0);
    assert_eq!(value["transaction_count"], 2);
    assert_eq!(value["monthly_breakdown"][0]["month"], "2024-01");
    assert_eq!(value["top_expenses"][0]["date"], "2024-01-05");
    assert_eq!(value["top_expenses"][0]["amount"], 500.0);
    assert_eq!(value["income_sources"][0]["description"], "pay");
    assert_eq!(value["category_breakdown"][1]["category"], "Food");
}

#[test]
fn start_after_end_is_an_invalid_range() {
    let err = DateRange::new(Some(date("2024-02-01")), Some(date("2024-01-01"))).unwrap_err();
    assert!(matches!(err, Error::InvalidRange { .. }));
    assert!(DateRange::new(Some(date("2024-01-01")), Some(date("2024-01-01"))).is_ok());
    assert!(DateRange::new(None, Some(date("2024-01-01"))).is_ok());
}

#[test]
fn filter_is_inclusive_and_case_insensitive() {
    let filter = TransactionFilter {
        range: DateRange::new(Some(date("2024-01-10")), Some(date("2024-02-01"))).unwrap(),
        category: Some("sAL".into()),
    };
    let kept: Vec<i64> = sample()
        .into_iter()
        .filter(|t| filter.matches(t))
        .map(|t| t.id)
        .collect();
    assert_eq!(kept, vec![1]);

    let food = TransactionFilter {
        category: Some("OO".into()),
        ..Default::default()
    };
    assert_eq!(sample().iter().filter(|t| food.matches(t)).count(), 2);
}
