// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db;
use crate::models::{Transaction, TxKind};
use crate::utils::{
    arg, get_display_currency, maybe_print_json, opt_arg, parse_currency, parse_date,
    parse_decimal, parse_period, pretty_table,
};
use anyhow::{Result, bail};
use rusqlite::Connection;
use serde::Serialize;
use tracing::info;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("rm", sub)) => rm(conn, sub)?,
        _ => {}
    }
    Ok(())
}

/// Builds a transaction from `tx add` arguments. Currency defaults to the
/// display currency.
pub fn from_args(conn: &Connection, sub: &clap::ArgMatches) -> Result<Transaction> {
    let date = parse_date(arg(sub, "date")?)?;
    let kind = arg(sub, "kind")?.parse::<TxKind>()?;
    let amount = parse_decimal(arg(sub, "amount")?)?;
    if amount.is_sign_negative() {
        bail!("Amount must not be negative; use --kind to record direction");
    }
    let currency = match opt_arg(sub, "currency") {
        Some(c) => parse_currency(c)?,
        None => get_display_currency(conn)?,
    };
    let mut tx = Transaction::new(0, kind, amount, &currency, arg(sub, "account")?, date);
    if let Some(c) = opt_arg(sub, "category") {
        tx = tx.category(c);
    }
    if let Some(n) = opt_arg(sub, "note") {
        tx = tx.note(n);
    }
    if let Some(to) = opt_arg(sub, "to_account") {
        if kind != TxKind::Transfer {
            bail!("--to-account only applies to transfers");
        }
        tx = tx.to_account(to);
    }
    Ok(tx)
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let tx = from_args(conn, sub)?;
    let id = db::insert_transaction(conn, &tx)?;
    info!(id, kind = %tx.kind, "transaction recorded");
    println!(
        "Recorded {} {} {} on {} (acct: {}, id: {})",
        tx.kind, tx.amount, tx.currency, tx.date, tx.account, id
    );
    Ok(())
}

/// Replaces fields on an existing transaction; the id is kept.
pub fn apply_edit(mut tx: Transaction, sub: &clap::ArgMatches) -> Result<Transaction> {
    if let Some(d) = opt_arg(sub, "date") {
        tx.date = parse_date(d)?;
    }
    if let Some(k) = opt_arg(sub, "kind") {
        tx.kind = k.parse()?;
    }
    if let Some(a) = opt_arg(sub, "amount") {
        let amount = parse_decimal(a)?;
        if amount.is_sign_negative() {
            bail!("Amount must not be negative; use --kind to record direction");
        }
        tx.amount = amount;
    }
    if let Some(c) = opt_arg(sub, "currency") {
        tx.currency = parse_currency(c)?;
    }
    if let Some(a) = opt_arg(sub, "account") {
        tx.account = a.to_string();
    }
    if let Some(c) = opt_arg(sub, "category") {
        tx.category = c.to_string();
    }
    if let Some(n) = opt_arg(sub, "note") {
        tx.note = n.to_string();
    }
    if let Some(to) = opt_arg(sub, "to_account") {
        tx.to_account = Some(to.to_string());
    }
    if tx.kind != TxKind::Transfer {
        tx.to_account = None;
    }
    Ok(tx)
}

fn edit(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub
        .get_one::<i64>("id")
        .ok_or_else(|| anyhow::anyhow!("Missing required argument 'id'"))?;
    let Some(existing) = db::get_transaction(conn, id)? else {
        bail!("Transaction {} not found", id);
    };
    let tx = apply_edit(existing, sub)?;
    db::update_transaction(conn, &tx)?;
    info!(id, "transaction edited");
    println!("Updated transaction {}", id);
    Ok(())
}

fn rm(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub
        .get_one::<i64>("id")
        .ok_or_else(|| anyhow::anyhow!("Missing required argument 'id'"))?;
    if !db::delete_transaction(conn, id)? {
        bail!("Transaction {} not found", id);
    }
    info!(id, "transaction removed");
    println!("Removed transaction {}", id);
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(conn, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.date.clone(),
                    r.kind.clone(),
                    r.account.clone(),
                    r.amount.clone(),
                    r.currency.clone(),
                    r.category.clone(),
                    r.note.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Date", "Kind", "Account", "Amount", "CCY", "Category", "Note"],
                rows,
            )
        );
    }
    Ok(())
}

#[derive(Serialize)]
pub struct TransactionRow {
    pub id: i64,
    pub date: String,
    pub kind: String,
    pub account: String,
    pub amount: String,
    pub currency: String,
    pub category: String,
    pub note: String,
}

/// Newest first, filtered by the `tx list` arguments.
pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<TransactionRow>> {
    let period = parse_period(opt_arg(sub, "month"))?;
    let account = opt_arg(sub, "account");
    let category = opt_arg(sub, "category");
    let limit = sub.get_one::<usize>("limit").copied().unwrap_or(usize::MAX);

    let loaded = db::load_transactions(conn)?;
    let rows = loaded
        .transactions
        .into_iter()
        .rev()
        .filter(|t| period.contains(t.date))
        .filter(|t| account.is_none_or(|a| t.account.eq_ignore_ascii_case(a)))
        .filter(|t| category.is_none_or(|c| t.category.eq_ignore_ascii_case(c)))
        .take(limit)
        .map(|t| TransactionRow {
            id: t.id,
            date: t.date.to_string(),
            kind: t.kind.to_string(),
            account: match &t.to_account {
                Some(to) => format!("{} -> {}", t.account, to),
                None => t.account.clone(),
            },
            amount: t.amount.to_string(),
            currency: t.currency,
            category: t.category,
            note: t.note,
        })
        .collect();
    Ok(rows)
}
