// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::currency::convert_checked;
use crate::db;
use crate::error::LedgerError;
use crate::utils::{arg, parse_currency, parse_decimal, pretty_table, set_display_currency};
use anyhow::{Result, bail};
use rusqlite::Connection;
use tracing::{info, warn};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set-display", sub)) => {
            let ccy = parse_currency(arg(sub, "currency")?)?;
            set_display_currency(conn, &ccy)?;
            info!(currency = %ccy, "display currency changed");
            println!("Display currency set to {}", ccy);
        }
        Some(("set", sub)) => {
            let from = parse_currency(arg(sub, "from")?)?;
            let to = parse_currency(arg(sub, "to")?)?;
            let rate = parse_decimal(arg(sub, "rate")?)?;
            if rate <= rust_decimal::Decimal::ZERO {
                bail!("Rate must be positive");
            }
            db::set_rate(conn, &from, &to, rate)?;
            println!("1 {} = {} {}", from, rate, to);
        }
        Some(("rm", sub)) => {
            let from = parse_currency(arg(sub, "from")?)?;
            let to = parse_currency(arg(sub, "to")?)?;
            if !db::remove_rate(conn, &from, &to)? {
                bail!("No {}_{} rate stored", from, to);
            }
            println!("Removed {}_{}", from, to);
        }
        Some(("list", _)) => list_rates(conn)?,
        Some(("convert", sub)) => convert_amount(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn list_rates(conn: &Connection) -> Result<()> {
    let rates = db::load_rates(conn)?;
    let data = rates
        .iter()
        .map(|(pair, rate)| vec![pair.to_string(), rate.to_string()])
        .collect();
    println!("{}", pretty_table(&["Pair", "Rate"], data));
    Ok(())
}

fn convert_amount(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let amount = parse_decimal(arg(sub, "amount")?)?;
    let from = parse_currency(arg(sub, "from")?)?;
    let to = parse_currency(arg(sub, "to")?)?;
    let rates = db::load_rates(conn)?;
    let res = match convert_checked(amount, &from, &to, &rates) {
        Ok(v) => v,
        Err(err @ LedgerError::Overflow { .. }) => return Err(err.into()),
        Err(err) => {
            warn!(%err, "falling back to rate 1.0");
            eprintln!("warning: {}; using 1.0", err);
            amount
        }
    };
    println!("{} {} -> {:.4} {}", amount, from, res, to);
    Ok(())
}
