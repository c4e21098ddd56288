// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::budget::{BudgetLevel, derive_budgets};
use crate::commands::reports::{aggregate_stored, target_currency};
use crate::db;
use crate::models::Budget;
use crate::throttle::NotificationThrottle;
use crate::utils::{arg, maybe_print_json, opt_arg, parse_decimal, parse_period, pretty_table};
use anyhow::{Result, bail};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use tracing::{info, warn};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => set(conn, sub)?,
        Some(("list", _)) => list(conn)?,
        Some(("rm", sub)) => rm(conn, sub)?,
        Some(("status", sub)) => status(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn set(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let cat = arg(sub, "category")?;
    let limit = parse_decimal(arg(sub, "limit")?)?;
    if cat.is_empty() {
        bail!("Category must not be empty");
    }
    let id = db::set_budget(conn, cat, limit)?;
    info!(id, category = cat, %limit, "budget set");
    println!("Budget set for {} = {}", cat, limit);
    Ok(())
}

fn list(conn: &Connection) -> Result<()> {
    let data = db::load_budgets(conn)?
        .into_iter()
        .map(|b| vec![b.id.to_string(), b.category, b.limit_amount.to_string()])
        .collect();
    println!("{}", pretty_table(&["ID", "Category", "Limit"], data));
    Ok(())
}

fn rm(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let cat = arg(sub, "category")?;
    if !db::remove_budget(conn, cat)? {
        bail!("No budget for '{}'", cat);
    }
    println!("Removed budget for {}", cat);
    Ok(())
}

/// Budgets with spend derived from stored transactions.
pub fn evaluate(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<Budget>> {
    let period = parse_period(opt_arg(sub, "month"))?;
    let ccy = target_currency(conn, sub)?;
    let agg = aggregate_stored(conn, period, &ccy)?;
    let records = db::load_budgets(conn)?;
    Ok(derive_budgets(&records, &agg))
}

/// Runs every budget through `throttle`, returning the alerts to deliver.
pub fn collect_alerts(
    budgets: &[Budget],
    throttle: &NotificationThrottle,
    now: DateTime<Utc>,
) -> Vec<String> {
    budgets
        .iter()
        .filter(|b| throttle.check_and_record(&b.category, b.status.percentage, now))
        .map(|b| {
            format!(
                "{}: {:.0}% of {} used. {}",
                b.category,
                b.status.percentage,
                b.limit_amount,
                b.status.message
            )
        })
        .collect()
}

fn status(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let budgets = evaluate(conn, sub)?;
    if sub.get_flag("notify") {
        // process-local: cooldown and cap reset on every invocation
        let throttle = NotificationThrottle::default();
        for alert in collect_alerts(&budgets, &throttle, Utc::now()) {
            warn!(%alert, "budget threshold crossed");
            eprintln!("ALERT {}", alert);
        }
    }
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &budgets)? {
        let data = budgets
            .iter()
            .map(|b| {
                let level = match b.status.level {
                    BudgetLevel::OnTrack => "on track",
                    BudgetLevel::Warning => "warning",
                    BudgetLevel::Critical => "critical",
                };
                vec![
                    b.category.clone(),
                    format!("{:.2}", b.limit_amount),
                    format!("{:.2}", b.current_spend),
                    format!("{:.1}%", b.status.percentage),
                    level.to_string(),
                    b.status.message.to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Category", "Limit", "Spent", "Used", "Status", "Message"],
                data
            )
        );
    }
    Ok(())
}
