// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::NewUser;
use crate::password::PasswordHash;
use crate::store::{SqliteStore, UserStore};
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::{Context, Result, bail};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    handle_with_cost(conn, m, PasswordHash::DEFAULT_COST)
}

/// Same as [`handle`] but with an explicit bcrypt cost, so tests can hash
/// quickly.
pub fn handle_with_cost(conn: &Connection, m: &clap::ArgMatches, cost: u32) -> Result<()> {
    let store = SqliteStore::new(conn);
    match m.subcommand() {
        Some(("add", sub)) => add(&store, sub, cost)?,
        Some(("list", sub)) => list(&store, sub)?,
        Some(("verify", sub)) => verify(&store, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(store: &SqliteStore<'_>, sub: &clap::ArgMatches, cost: u32) -> Result<()> {
    let username = sub.get_one::<String>("username").unwrap().trim();
    let email = sub.get_one::<String>("email").unwrap().trim();
    let password = sub.get_one::<String>("password").unwrap();
    if username.is_empty() || email.is_empty() {
        bail!("Username and email must not be empty");
    }
    let new = NewUser {
        username: username.to_string(),
        email: email.to_string(),
        password_hash: PasswordHash::from_raw_password(password, cost)?,
    };
    let user = store.create_user(&new)?;
    println!("Added user '{}' <{}>", user.username, user.email);
    Ok(())
}

fn list(store: &SqliteStore<'_>, sub: &clap::ArgMatches) -> Result<()> {
    let users = store.list_users()?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &users)? {
        let rows = users
            .iter()
            .map(|u| {
                vec![
                    u.id.to_string(),
                    u.username.clone(),
                    u.email.clone(),
                    u.created_at.to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["ID", "Username", "Email", "Created"], rows)
        );
    }
    Ok(())
}

fn verify(store: &SqliteStore<'_>, sub: &clap::ArgMatches) -> Result<()> {
    let login = sub.get_one::<String>("login").unwrap().trim();
    let password = sub.get_one::<String>("password").unwrap();
    let user = store
        .find_user(login)?
        .filter(|u| u.password_hash.verify(password))
        .context("Invalid credentials")?;
    println!("Credentials OK for '{}'", user.username);
    Ok(())
}
