// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print as JSON lines"),
    )
}

fn month_arg() -> Arg {
    Arg::new("month").long("month").help("Restrict to YYYY-MM")
}

fn currency_arg() -> Arg {
    Arg::new("currency")
        .long("currency")
        .help("Display currency (defaults to the configured one)")
}

fn tx_fields(cmd: Command, required: bool) -> Command {
    cmd.arg(Arg::new("date").long("date").required(required).help("YYYY-MM-DD"))
        .arg(
            Arg::new("kind")
                .long("kind")
                .required(required)
                .value_parser(["income", "expense", "transfer"]),
        )
        .arg(
            Arg::new("amount")
                .long("amount")
                .required(required)
                .allow_negative_numbers(true),
        )
        .arg(Arg::new("account").long("account").required(required))
        .arg(Arg::new("currency").long("currency"))
        .arg(Arg::new("category").long("category"))
        .arg(
            Arg::new("to_account")
                .long("to-account")
                .help("Destination account for transfers"),
        )
        .arg(Arg::new("note").long("note"))
}

fn id_arg() -> Arg {
    Arg::new("id")
        .long("id")
        .required(true)
        .value_parser(value_parser!(i64))
}

pub fn build_cli() -> Command {
    Command::new("pocketledger")
        .about("Multi-currency ledger with budget thresholds")
        .version(clap::crate_version!())
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(
            Command::new("tx")
                .about("Transactions")
                .subcommand(tx_fields(Command::new("add"), true))
                .subcommand(json_flags(
                    Command::new("list")
                        .arg(month_arg())
                        .arg(Arg::new("account").long("account"))
                        .arg(Arg::new("category").long("category"))
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        ),
                ))
                .subcommand(tx_fields(Command::new("edit").arg(id_arg()), false))
                .subcommand(Command::new("rm").arg(id_arg())),
        )
        .subcommand(
            Command::new("budget")
                .about("Category spending limits")
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("category").long("category").required(true))
                        .arg(Arg::new("limit").long("limit").required(true)),
                )
                .subcommand(Command::new("list"))
                .subcommand(
                    Command::new("rm").arg(Arg::new("category").long("category").required(true)),
                )
                .subcommand(json_flags(
                    Command::new("status")
                        .arg(month_arg())
                        .arg(currency_arg())
                        .arg(
                            Arg::new("notify")
                                .long("notify")
                                .action(ArgAction::SetTrue)
                                .help("Emit threshold alerts; cooldown and cap reset on every run"),
                        ),
                )),
        )
        .subcommand(
            Command::new("fx")
                .about("Exchange rates and display currency")
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("from").long("from").required(true))
                        .arg(Arg::new("to").long("to").required(true))
                        .arg(Arg::new("rate").long("rate").required(true)),
                )
                .subcommand(Command::new("list"))
                .subcommand(
                    Command::new("rm")
                        .arg(Arg::new("from").long("from").required(true))
                        .arg(Arg::new("to").long("to").required(true)),
                )
                .subcommand(
                    Command::new("convert")
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(Arg::new("from").long("from").required(true))
                        .arg(Arg::new("to").long("to").required(true)),
                )
                .subcommand(
                    Command::new("set-display")
                        .arg(Arg::new("currency").long("currency").required(true)),
                ),
        )
        .subcommand(
            Command::new("report")
                .about("Balances and summaries")
                .subcommand(json_flags(
                    Command::new("balances").arg(month_arg()).arg(currency_arg()),
                ))
                .subcommand(json_flags(
                    Command::new("summary").arg(month_arg()).arg(currency_arg()),
                ))
                .subcommand(json_flags(
                    Command::new("by-category").arg(month_arg()).arg(currency_arg()),
                ))
                .subcommand(json_flags(
                    Command::new("monthly").arg(currency_arg()).arg(
                        Arg::new("months")
                            .long("months")
                            .value_parser(value_parser!(usize)),
                    ),
                )),
        )
        .subcommand(json_flags(
            Command::new("doctor").about("List transactions the aggregation could not use cleanly"),
        ))
}
