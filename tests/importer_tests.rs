// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use fintrack::error::{Error, RowFault, RowParseError};
use fintrack::models::{DateRange, NewTransaction, Transaction, TransactionUpdate};
use fintrack::store::{SqliteStore, TransactionStore};
use fintrack::{aggregate, cli, commands::importer, db, ingest};
use rusqlite::Connection;
use std::io::Write;
use tempfile::NamedTempFile;

fn base_conn() -> Connection {
    let conn = db::open_in_memory().unwrap();
    conn.execute(
        "INSERT INTO users(id,username,email,password_hash) VALUES (1,'alice','alice@example.com','x')",
        [],
    )
    .unwrap();
    conn
}

fn count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM transactions", [], |r| r.get(0))
        .unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn partial_batch_commits_good_rows_and_reports_bad_ones() {
    let conn = base_conn();
    let store = SqliteStore::new(&conn);
    let csv = "date,category,amount,description\n\
               2024-01-01,Salary,50000,pay\n\
               2024-01-05,Food,-500,lunch\n\
               bad-date,X,10,\n";

    let outcome = ingest::ingest(&store, 1, csv.as_bytes()).unwrap();
    assert_eq!(outcome.created_count, 2);
    let messages: Vec<String> = outcome.errors.iter().map(|e| e.to_string()).collect();
    assert_eq!(messages, vec!["Row 3: invalid date"]);

    let snapshot = store.transactions_for_user(1, &DateRange::unbounded()).unwrap();
    let totals = aggregate::totals(&snapshot);
    assert_eq!(totals.total_income, 50000.0);
    assert_eq!(totals.total_expenses, 500.0);
    assert_eq!(totals.net_balance, 49500.0);
    assert_eq!(totals.transaction_count, 2);
}

#[test]
fn outcome_serializes_errors_as_messages() {
    let conn = base_conn();
    let store = SqliteStore::new(&conn);
    let csv = "date,category,amount\n2024-01-01,Food,abc\n";
    let outcome = ingest::ingest(&store, 1, csv.as_bytes()).unwrap();
    let value = serde_json::to_value(&outcome).unwrap();
    assert_eq!(
        value,
        serde_json::json!({ "created_count": 0, "errors": ["Row 1: invalid amount"] })
    );
}

#[test]
fn missing_required_column_rejects_whole_payload() {
    let conn = base_conn();
    let store = SqliteStore::new(&conn);
    let csv = "date,category,description\n2024-01-01,Food,lunch\n";

    let err = ingest::ingest(&store, 1, csv.as_bytes()).unwrap_err();
    match err {
        Error::Schema { missing } => assert_eq!(missing, vec!["amount".to_string()]),
        other => panic!("expected schema error, got {other:?}"),
    }
    assert_eq!(count(&conn), 0);
}

#[test]
fn column_names_must_match_exactly() {
    let csv = "Date,Category,Amount\n2024-01-01,Food,-5\n";
    let err = ingest::parse_payload(csv.as_bytes(), 1).unwrap_err();
    assert!(matches!(err, Error::Schema { ref missing } if missing.len() == 3));
}

#[test]
fn description_column_is_optional_and_order_is_free() {
    let csv = "amount,notes,category,date\n-12.50,ignored,Coffee,2024-03-02\n";
    let batch = ingest::parse_payload(csv.as_bytes(), 7).unwrap();
    assert!(batch.rejected.is_empty());
    assert_eq!(
        batch.accepted,
        vec![NewTransaction {
            user_id: 7,
            date: date(2024, 3, 2),
            category: "Coffee".into(),
            amount: -12.5,
            description: String::new(),
        }]
    );
}

#[test]
fn fields_are_trimmed() {
    let csv = "date , category , amount , description\n 2024-03-02 ,  Rent , -900 ,  March  \n";
    let batch = ingest::parse_payload(csv.as_bytes(), 1).unwrap();
    assert_eq!(batch.accepted.len(), 1);
    assert_eq!(batch.accepted[0].category, "Rent");
    assert_eq!(batch.accepted[0].description, "March");
}

#[test]
fn accepts_several_date_formats() {
    for raw in [
        "2024-02-29",
        "2024/02/29",
        "02/29/2024",
        "29-Feb-2024",
        "Feb 29, 2024",
        "2024-02-29T10:15:00",
        "2024-02-29 23:59:59",
        "2024-02-29T10:15:00+05:30",
    ] {
        assert_eq!(
            ingest::parse_flexible_date(raw),
            Some(date(2024, 2, 29)),
            "format {raw}"
        );
    }
    assert_eq!(ingest::parse_flexible_date("2023-02-29"), None);
    assert_eq!(ingest::parse_flexible_date("yesterday"), None);
}

#[test]
fn amount_parsing_is_strict_decimal() {
    assert_eq!(ingest::parse_amount("-500"), Some(-500.0));
    assert_eq!(ingest::parse_amount("+1250.75"), Some(1250.75));
    assert_eq!(ingest::parse_amount("1e3"), Some(1000.0));
    assert_eq!(ingest::parse_amount("0"), Some(0.0));
    assert_eq!(ingest::parse_amount("1e30"), Some(1e30));
    assert_eq!(ingest::parse_amount("1e-30"), Some(1e-30));
    assert_eq!(ingest::parse_amount("-2.5E+29"), Some(-2.5e29));
    assert_eq!(
        ingest::parse_amount("100000000000000000000000000000"),
        Some(1e29)
    );
    assert_eq!(ingest::parse_amount("1e999"), None);
    assert_eq!(ingest::parse_amount("infinity"), None);
    assert_eq!(ingest::parse_amount("-nan"), None);
    assert_eq!(ingest::parse_amount("abc"), None);
    assert_eq!(ingest::parse_amount("NaN"), None);
    assert_eq!(ingest::parse_amount("inf"), None);
    assert_eq!(ingest::parse_amount("1,000"), None);
}

#[test]
fn row_faults_keep_original_one_based_positions() {
    let csv = "date,category,amount\n\
               2024-01-01,Food,-1\n\
               ,Food,-1\n\
               2024-01-02,,-1\n\
               2024-01-03,Food\n\
               2024-13-01,Food,-1\n\
               2024-01-04,Food,ten\n\
               2024-01-05,Food,-1\n";
    let batch = ingest::parse_payload(csv.as_bytes(), 1).unwrap();
    assert_eq!(batch.accepted.len(), 2);
    assert_eq!(
        batch.rejected,
        vec![
            RowParseError { row: 2, fault: RowFault::MissingField("date") },
            RowParseError { row: 3, fault: RowFault::MissingField("category") },
            RowParseError { row: 4, fault: RowFault::MissingField("amount") },
            RowParseError { row: 5, fault: RowFault::InvalidDate },
            RowParseError { row: 6, fault: RowFault::InvalidAmount },
        ]
    );
}

#[test]
fn header_only_payload_creates_nothing() {
    let conn = base_conn();
    let store = SqliteStore::new(&conn);
    let outcome = ingest::ingest(&store, 1, "date,category,amount\n".as_bytes()).unwrap();
    assert_eq!(outcome.created_count, 0);
    assert!(outcome.errors.is_empty());
}

#[test]
fn resubmitting_a_payload_duplicates_rows() {
    let conn = base_conn();
    let store = SqliteStore::new(&conn);
    let csv = "date,category,amount\n2024-01-01,Food,-5\n2024-01-02,Food,-6\n";
    ingest::ingest(&store, 1, csv.as_bytes()).unwrap();
    ingest::ingest(&store, 1, csv.as_bytes()).unwrap();
    assert_eq!(count(&conn), 4);
}

#[test]
fn failed_batch_write_commits_nothing() {
    let conn = base_conn();
    conn.execute_batch(
        "CREATE TRIGGER reject_boom BEFORE INSERT ON transactions
         WHEN NEW.category = 'Boom'
         BEGIN SELECT RAISE(ABORT, 'boom'); END;",
    )
    .unwrap();
    let store = SqliteStore::new(&conn);
    let csv = "date,category,amount\n2024-01-01,Food,-5\n2024-01-02,Boom,-6\n2024-01-03,Food,-7\n";

    let err = ingest::ingest(&store, 1, csv.as_bytes()).unwrap_err();
    assert!(matches!(err, Error::Storage(_)));
    assert_eq!(count(&conn), 0);
}

struct UnavailableStore;

impl TransactionStore for UnavailableStore {
    fn create_transaction(&self, _: &NewTransaction) -> Result<Transaction, Error> {
        unreachable!()
    }
    fn insert_batch(&self, _: &[NewTransaction]) -> Result<usize, Error> {
        Err(Error::Storage(rusqlite::Error::ExecuteReturnedResults))
    }
    fn get_transaction(&self, _: i64, _: i64) -> Result<Transaction, Error> {
        unreachable!()
    }
    fn update_transaction(&self, _: i64, _: i64, _: &TransactionUpdate) -> Result<Transaction, Error> {
        unreachable!()
    }
    fn delete_transaction(&self, _: i64, _: i64) -> Result<(), Error> {
        unreachable!()
    }
    fn transactions_for_user(&self, _: i64, _: &DateRange) -> Result<Vec<Transaction>, Error> {
        Ok(Vec::new())
    }
}

#[test]
fn storage_failure_is_fatal_even_with_row_errors() {
    let csv = "date,category,amount\n2024-01-01,Food,-5\nnope,Food,-6\n";
    let err = ingest::ingest(&UnavailableStore, 1, csv.as_bytes()).unwrap_err();
    assert!(matches!(err, Error::Storage(_)));
}

#[test]
fn importer_command_trims_path_and_uses_selected_user() {
    let conn = base_conn();
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "date,category,amount,description\n2025-02-03,Shop,-5.00,\n2025-02-04,Shop,oops,"
    )
    .unwrap();
    file.flush().unwrap();

    let padded = format!("  {}  ", file.path().to_str().unwrap());
    let matches = cli::build_cli().get_matches_from([
        "fintrack", "--user", "alice", "import", "transactions", "--path", &padded,
    ]);
    if let Some(("import", import_m)) = matches.subcommand() {
        if let Some(("transactions", sub)) = import_m.subcommand() {
            let outcome = importer::import_transactions(&conn, sub).unwrap();
            assert_eq!(outcome.created_count, 1);
            assert_eq!(outcome.errors[0].to_string(), "Row 2: invalid amount");
        } else {
            panic!("no transactions subcommand");
        }
    } else {
        panic!("no import subcommand");
    }

    let user_id: i64 = conn
        .query_row("SELECT user_id FROM transactions", [], |r| r.get(0))
        .unwrap();
    assert_eq!(user_id, 1);
}

#[test]
fn importer_command_requires_known_user() {
    let conn = base_conn();
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "date,category,amount\n2025-02-03,Shop,-5.00").unwrap();
    file.flush().unwrap();

    let path = file.path().to_str().unwrap().to_string();
    let matches = cli::build_cli().get_matches_from([
        "fintrack", "import", "transactions", "--path", &path, "--user", "bob",
    ]);
    if let Some(("import", import_m)) = matches.subcommand() {
        let err = importer::handle(&conn, import_m).unwrap_err();
        assert!(err.to_string().contains("User 'bob' not found"));
    } else {
        panic!("no import subcommand");
    }
    assert_eq!(count(&conn), 0);
}

#[test]
fn importer_command_surfaces_schema_error() {
    let conn = base_conn();
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "when,what,how_much\n2025-02-03,Shop,-5.00").unwrap();
    file.flush().unwrap();

    let path = file.path().to_str().unwrap().to_string();
    let matches = cli::build_cli().get_matches_from([
        "fintrack", "--user", "alice@example.com", "import", "transactions", "--path", &path,
    ]);
    if let Some(("import", import_m)) = matches.subcommand() {
        let err = importer::handle(&conn, import_m).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::Schema { .. })
        ));
    } else {
        panic!("no import subcommand");
    }
    assert_eq!(count(&conn), 0);
}

#[test]
fn amounts_beyond_decimal_range_are_imported() {
    let conn = base_conn();
    let store = SqliteStore::new(&conn);
    let csv = "date,category,amount\n2024-01-01,Windfall,1e30\n2024-01-02,Dust,-1e-30\n2024-01-03,Bad,inf\n";
    let outcome = ingest::ingest(&store, 1, csv.as_bytes()).unwrap();
    assert_eq!(outcome.created_count, 2);
    let messages: Vec<String> = outcome.errors.iter().map(|e| e.to_string()).collect();
    assert_eq!(messages, vec!["Row 3: invalid amount"]);

    let snapshot = store.transactions_for_user(1, &DateRange::unbounded()).unwrap();
    assert_eq!(snapshot[0].amount, 1e30);
    assert_eq!(snapshot[1].amount, -1e-30);
}
