// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::HashSet;

use crate::db;
use crate::error::Diagnostic;
use crate::ledger::{Aggregation, Period, aggregate_in, monthly_summaries};
use crate::utils::{
    get_display_currency, maybe_print_json, opt_arg, parse_currency, parse_period, pretty_table,
};
use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("balances", sub)) => balances(conn, sub)?,
        Some(("summary", sub)) => summary(conn, sub)?,
        Some(("by-category", sub)) => by_category(conn, sub)?,
        Some(("monthly", sub)) => monthly(conn, sub)?,
        _ => {}
    }
    Ok(())
}

/// `--currency` if given, else the configured display currency.
pub fn target_currency(conn: &Connection, sub: &clap::ArgMatches) -> Result<String> {
    match opt_arg(sub, "currency") {
        Some(c) => parse_currency(c),
        None => get_display_currency(conn),
    }
}

/// Loads everything from the database and aggregates it for `period`.
///
/// Rows that failed to load cleanly are reported alongside the aggregation's
/// own diagnostics. Rows with no readable date cannot be placed in a period,
/// so they are always reported.
pub fn aggregate_stored(conn: &Connection, period: Period, currency: &str) -> Result<Aggregation> {
    let loaded = db::load_transactions(conn)?;
    let rates = db::load_rates(conn)?;
    let mut agg = aggregate_in(period, &loaded.transactions, currency, &rates);
    let in_period: HashSet<i64> = loaded
        .transactions
        .iter()
        .filter(|t| period.contains(t.date))
        .map(|t| t.id)
        .collect();
    let mut diags: Vec<_> = loaded
        .diagnostics
        .into_iter()
        .filter(|d| {
            matches!(d, Diagnostic::InvalidDate { .. }) || in_period.contains(&d.transaction_id())
        })
        .collect();
    diags.append(&mut agg.diagnostics);
    agg.diagnostics = diags;
    Ok(agg)
}

fn warn_diagnostics(agg: &Aggregation) {
    if !agg.diagnostics.is_empty() {
        eprintln!(
            "note: {} transaction(s) were skipped, zeroed or converted at 1.0; run `pocketledger doctor`",
            agg.diagnostics.len()
        );
    }
}

fn balances(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let period = parse_period(opt_arg(sub, "month"))?;
    let ccy = target_currency(conn, sub)?;
    let agg = aggregate_stored(conn, period, &ccy)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &agg.account_balances)? {
        let data = agg
            .account_balances
            .iter()
            .map(|(acct, bal)| vec![acct.to_string(), ccy.clone(), format!("{:.2}", bal)])
            .collect();
        println!("{}", pretty_table(&["Account", "CCY", "Balance"], data));
        warn_diagnostics(&agg);
    }
    Ok(())
}

fn summary(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let period = parse_period(opt_arg(sub, "month"))?;
    let ccy = target_currency(conn, sub)?;
    let agg = aggregate_stored(conn, period, &ccy)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &agg)? {
        let data = vec![
            vec!["Income".to_string(), format!("{:.2}", agg.total_income)],
            vec!["Expense".to_string(), format!("{:.2}", agg.total_expense)],
            vec!["Net".to_string(), format!("{:.2}", agg.net_balance)],
        ];
        let hdr = format!("Amount ({})", ccy);
        println!("{}", pretty_table(&["", &hdr], data));
        warn_diagnostics(&agg);
    }
    Ok(())
}

#[derive(Serialize)]
struct CategoryRow {
    category: String,
    spent: rust_decimal::Decimal,
}

fn by_category(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let period = parse_period(opt_arg(sub, "month"))?;
    let ccy = target_currency(conn, sub)?;
    let agg = aggregate_stored(conn, period, &ccy)?;
    let mut items: Vec<CategoryRow> = agg
        .category_spend
        .iter()
        .map(|(c, v)| CategoryRow {
            category: c.clone(),
            spent: *v,
        })
        .collect();
    items.sort_by(|a, b| b.spent.cmp(&a.spent));
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &items)? {
        let data = items
            .iter()
            .map(|r| vec![r.category.clone(), format!("{:.2}", r.spent)])
            .collect();
        let hdr = format!("Spent ({})", ccy);
        println!("{}", pretty_table(&["Category", &hdr], data));
        warn_diagnostics(&agg);
    }
    Ok(())
}

fn monthly(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let months: usize = *sub.get_one::<usize>("months").unwrap_or(&12);
    let ccy = target_currency(conn, sub)?;
    let loaded = db::load_transactions(conn)?;
    let rates = db::load_rates(conn)?;
    let rows: Vec<_> = monthly_summaries(&loaded.transactions, &ccy, &rates)
        .into_iter()
        .take(months)
        .collect();
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &rows)? {
        let data = rows
            .iter()
            .map(|r| {
                vec![
                    r.month.clone(),
                    format!("{:.2}", r.income),
                    format!("{:.2}", r.expense),
                    format!("{:.2}", r.net),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Month", "Income", "Expense", "Net"], data)
        );
    }
    Ok(())
}
