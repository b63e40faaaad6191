// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The durable record of users and their transactions.
//!
//! Reads hand back plain snapshots (`Vec<Transaction>`); callers never hold a
//! live handle into the database. Every transaction operation is scoped to an
//! owning user, and a row owned by someone else is reported as not found.

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::Error;
use crate::models::{
    DateRange, NewTransaction, NewUser, Page, Transaction, TransactionFilter, TransactionUpdate,
    User,
};
use crate::password::PasswordHash;

pub trait TransactionStore {
    fn create_transaction(&self, new: &NewTransaction) -> Result<Transaction, Error>;

    /// Write every transaction in `batch` atomically: either all rows are
    /// committed or none are. Returns the number of rows written.
    fn insert_batch(&self, batch: &[NewTransaction]) -> Result<usize, Error>;

    fn get_transaction(&self, user_id: i64, id: i64) -> Result<Transaction, Error>;

    fn update_transaction(
        &self,
        user_id: i64,
        id: i64,
        update: &TransactionUpdate,
    ) -> Result<Transaction, Error>;

    fn delete_transaction(&self, user_id: i64, id: i64) -> Result<(), Error>;

    /// All of a user's transactions inside `range`, oldest first (ties by id).
    fn transactions_for_user(
        &self,
        user_id: i64,
        range: &DateRange,
    ) -> Result<Vec<Transaction>, Error>;

    /// The chronological working set for aggregation, with the category
    /// filter applied.
    fn snapshot(&self, user_id: i64, filter: &TransactionFilter) -> Result<Vec<Transaction>, Error> {
        let mut rows = self.transactions_for_user(user_id, &filter.range)?;
        rows.retain(|t| filter.matches(t));
        tracing::debug!(user_id, rows = rows.len(), "loaded transaction snapshot");
        Ok(rows)
    }

    /// A page of the raw listing, newest first.
    fn list_transactions(
        &self,
        user_id: i64,
        filter: &TransactionFilter,
        page: Page,
    ) -> Result<Vec<Transaction>, Error> {
        let rows = self.snapshot(user_id, filter)?;
        Ok(rows
            .into_iter()
            .rev()
            .skip(page.offset)
            .take(page.limit)
            .collect())
    }
}

pub trait UserStore {
    fn create_user(&self, new: &NewUser) -> Result<User, Error>;

    fn get_user(&self, id: i64) -> Result<User, Error>;

    /// Look a user up by username or email.
    fn find_user(&self, login: &str) -> Result<Option<User>, Error>;

    fn list_users(&self) -> Result<Vec<User>, Error>;
}

/// [`TransactionStore`] and [`UserStore`] backed by SQLite.
pub struct SqliteStore<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

const TRANSACTION_COLUMNS: &str = "id, user_id, date, category, amount, description, created_at";
const USER_COLUMNS: &str = "id, username, email, password_hash, created_at";

fn map_transaction(r: &Row<'_>) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: r.get(0)?,
        user_id: r.get(1)?,
        date: r.get(2)?,
        category: r.get(3)?,
        amount: r.get(4)?,
        description: r.get(5)?,
        created_at: r.get(6)?,
    })
}

fn map_user(r: &Row<'_>) -> rusqlite::Result<User> {
    let hash: String = r.get(3)?;
    Ok(User {
        id: r.get(0)?,
        username: r.get(1)?,
        email: r.get(2)?,
        password_hash: PasswordHash::new_unchecked(&hash),
        created_at: r.get(4)?,
    })
}

impl SqliteStore<'_> {
    fn user_exists(&self, user_id: i64) -> Result<bool, Error> {
        let found: Option<i64> = self
            .conn
            .query_row("SELECT 1 FROM users WHERE id=?1", params![user_id], |r| {
                r.get(0)
            })
            .optional()?;
        Ok(found.is_some())
    }
}

impl TransactionStore for SqliteStore<'_> {
    fn create_transaction(&self, new: &NewTransaction) -> Result<Transaction, Error> {
        if !self.user_exists(new.user_id)? {
            return Err(Error::NotFound(format!("user {}", new.user_id)));
        }
        self.conn.execute(
            "INSERT INTO transactions(user_id, date, category, amount, description)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                new.user_id,
                new.date,
                new.category,
                new.amount,
                new.description
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::debug!(id, user_id = new.user_id, "created transaction");
        self.get_transaction(new.user_id, id)
    }

    fn insert_batch(&self, batch: &[NewTransaction]) -> Result<usize, Error> {
        if batch.is_empty() {
            return Ok(0);
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO transactions(user_id, date, category, amount, description)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for t in batch {
                stmt.execute(params![t.user_id, t.date, t.category, t.amount, t.description])?;
            }
        }
        tx.commit()?;
        tracing::debug!(rows = batch.len(), "committed transaction batch");
        Ok(batch.len())
    }

    fn get_transaction(&self, user_id: i64, id: i64) -> Result<Transaction, Error> {
        let sql = format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id=?1 AND user_id=?2"
        );
        self.conn
            .query_row(&sql, params![id, user_id], map_transaction)
            .optional()?
            .ok_or_else(|| Error::NotFound(format!("transaction {}", id)))
    }

    fn update_transaction(
        &self,
        user_id: i64,
        id: i64,
        update: &TransactionUpdate,
    ) -> Result<Transaction, Error> {
        let changed = self.conn.execute(
            "UPDATE transactions SET date=?1, category=?2, amount=?3, description=?4
             WHERE id=?5 AND user_id=?6",
            params![
                update.date,
                update.category,
                update.amount,
                update.description,
                id,
                user_id
            ],
        )?;
        if changed == 0 {
            return Err(Error::NotFound(format!("transaction {}", id)));
        }
        tracing::debug!(id, user_id, "updated transaction");
        self.get_transaction(user_id, id)
    }

    fn delete_transaction(&self, user_id: i64, id: i64) -> Result<(), Error> {
        let changed = self.conn.execute(
            "DELETE FROM transactions WHERE id=?1 AND user_id=?2",
            params![id, user_id],
        )?;
        if changed == 0 {
            return Err(Error::NotFound(format!("transaction {}", id)));
        }
        tracing::debug!(id, user_id, "deleted transaction");
        Ok(())
    }

    fn transactions_for_user(
        &self,
        user_id: i64,
        range: &DateRange,
    ) -> Result<Vec<Transaction>, Error> {
        let sql = format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions
             WHERE user_id=?1
               AND (?2 IS NULL OR date >= ?2)
               AND (?3 IS NULL OR date <= ?3)
             ORDER BY date, id"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![user_id, range.start(), range.end()], map_transaction)?;
        let mut data = Vec::new();
        for row in rows {
            data.push(row?);
        }
        Ok(data)
    }
}

impl UserStore for SqliteStore<'_> {
    fn create_user(&self, new: &NewUser) -> Result<User, Error> {
        let taken = |column: &str, value: &str| -> Result<bool, Error> {
            let sql = format!("SELECT 1 FROM users WHERE {column}=?1");
            let found: Option<i64> = self
                .conn
                .query_row(&sql, params![value], |r| r.get(0))
                .optional()?;
            Ok(found.is_some())
        };
        if taken("username", &new.username)? {
            return Err(Error::DuplicateUsername(new.username.clone()));
        }
        if taken("email", &new.email)? {
            return Err(Error::DuplicateEmail(new.email.clone()));
        }
        self.conn.execute(
            "INSERT INTO users(username, email, password_hash) VALUES (?1, ?2, ?3)",
            params![new.username, new.email, new.password_hash.as_str()],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::info!(id, username = %new.username, "registered user");
        self.get_user(id)
    }

    fn get_user(&self, id: i64) -> Result<User, Error> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id=?1");
        self.conn
            .query_row(&sql, params![id], map_user)
            .optional()?
            .ok_or_else(|| Error::NotFound(format!("user {}", id)))
    }

    fn find_user(&self, login: &str) -> Result<Option<User>, Error> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username=?1 OR email=?1 ORDER BY id LIMIT 1"
        );
        Ok(self.conn.query_row(&sql, params![login], map_user).optional()?)
    }

    fn list_users(&self) -> Result<Vec<User>, Error> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY username");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], map_user)?;
        let mut data = Vec::new();
        for row in rows {
            data.push(row?);
        }
        Ok(data)
    }
}
