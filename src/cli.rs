// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, crate_version, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn filter_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("start")
            .long("start")
            .help("Inclusive start date (YYYY-MM-DD)"),
    )
    .arg(Arg::new("end").long("end").help("Inclusive end date (YYYY-MM-DD)"))
    .arg(
        Arg::new("category")
            .long("category")
            .help("Case-insensitive category substring"),
    )
}

fn report_args(cmd: Command) -> Command {
    filter_args(cmd).arg(
        Arg::new("limit")
            .long("limit")
            .value_parser(value_parser!(usize))
            .help("How many top expenses / income sources to rank"),
    )
}

fn id_arg() -> Arg {
    Arg::new("id")
        .long("id")
        .required(true)
        .value_parser(value_parser!(i64))
}

pub fn build_cli() -> Command {
    Command::new("fintrack")
        .version(crate_version!())
        .about("Personal finance ledger: import transactions, summarize, report")
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .env("FINTRACK_DB")
                .help("Path to the SQLite database"),
        )
        .arg(
            Arg::new("user")
                .long("user")
                .global(true)
                .env("FINTRACK_USER")
                .help("Username or email of the ledger owner"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::Count)
                .help("Increase log verbosity (-v info, -vv debug)"),
        )
        .subcommand(Command::new("init").about("Create the database if needed"))
        .subcommand(
            Command::new("user")
                .about("Manage users")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("username").long("username").required(true))
                        .arg(Arg::new("email").long("email").required(true))
                        .arg(Arg::new("password").long("password").required(true)),
                )
                .subcommand(json_flags(Command::new("list")))
                .subcommand(
                    Command::new("verify")
                        .about("Check a username/email and password")
                        .arg(Arg::new("login").long("login").required(true))
                        .arg(Arg::new("password").long("password").required(true)),
                ),
        )
        .subcommand(
            Command::new("tx")
                .about("Record and inspect transactions")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("date").long("date").required(true))
                        .arg(Arg::new("category").long("category").required(true))
                        .arg(
                            Arg::new("amount")
                                .long("amount")
                                .required(true)
                                .allow_hyphen_values(true)
                                .help("Positive for income, negative for expenses"),
                        )
                        .arg(Arg::new("description").long("description")),
                )
                .subcommand(json_flags(filter_args(
                    Command::new("list")
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize))
                                .default_value("100"),
                        )
                        .arg(
                            Arg::new("offset")
                                .long("offset")
                                .value_parser(value_parser!(usize))
                                .default_value("0"),
                        ),
                )))
                .subcommand(json_flags(Command::new("show").arg(id_arg())))
                .subcommand(
                    Command::new("edit")
                        .arg(id_arg())
                        .arg(Arg::new("date").long("date"))
                        .arg(Arg::new("category").long("category"))
                        .arg(
                            Arg::new("amount")
                                .long("amount")
                                .allow_hyphen_values(true),
                        )
                        .arg(Arg::new("description").long("description")),
                )
                .subcommand(Command::new("rm").arg(id_arg())),
        )
        .subcommand(
            Command::new("import")
                .about("Bulk-import transactions")
                .subcommand(
                    Command::new("transactions")
                        .about("Import a CSV with date, category, amount[, description] columns")
                        .arg(Arg::new("path").long("path").required(true))
                        .arg(
                            Arg::new("json")
                                .long("json")
                                .action(ArgAction::SetTrue),
                        ),
                ),
        )
        .subcommand(
            Command::new("report")
                .about("Summaries and reports")
                .subcommand(json_flags(report_args(Command::new("summary"))))
                .subcommand(report_args(Command::new("charts")))
                .subcommand(
                    report_args(Command::new("document"))
                        .arg(Arg::new("out").long("out").help("Write to a file instead of stdout"))
                        .arg(
                            Arg::new("json")
                                .long("json")
                                .action(ArgAction::SetTrue),
                        ),
                ),
        )
        .subcommand(
            Command::new("export").subcommand(
                Command::new("transactions")
                    .arg(
                        Arg::new("format")
                            .long("format")
                            .required(true)
                            .help("csv|json"),
                    )
                    .arg(Arg::new("out").long("out").required(true)),
            ),
        )
        .subcommand(
            Command::new("config")
                .about("Show or change persisted settings")
                .subcommand(Command::new("show"))
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("currency_symbol").long("currency-symbol"))
                        .arg(
                            Arg::new("top_n")
                                .long("top-n")
                                .value_parser(value_parser!(usize)),
                        ),
                ),
        )
}
