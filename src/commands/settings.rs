// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::Settings;
use crate::utils::pretty_table;
use anyhow::{Result, bail};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", _)) => {
            let s = Settings::load(conn)?;
            println!(
                "{}",
                pretty_table(
                    &["Setting", "Value"],
                    vec![
                        vec!["currency_symbol".into(), s.currency_symbol],
                        vec!["top_n".into(), s.top_n.to_string()],
                    ],
                )
            );
        }
        Some(("set", sub)) => {
            let mut s = Settings::load(conn)?;
            if let Some(sym) = sub.get_one::<String>("currency_symbol") {
                s.currency_symbol = sym.trim().to_string();
            }
            if let Some(n) = sub.get_one::<usize>("top_n") {
                if *n == 0 {
                    bail!("top-n must be at least 1");
                }
                s.top_n = *n;
            }
            s.save(conn)?;
            println!(
                "Settings saved (currency symbol '{}', top {})",
                s.currency_symbol, s.top_n
            );
        }
        _ => {}
    }
    Ok(())
}
