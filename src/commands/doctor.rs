// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::reports::aggregate_stored;
use crate::ledger::Period;
use crate::utils::{get_display_currency, maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let ccy = get_display_currency(conn)?;
    let agg = aggregate_stored(conn, Period::All, &ccy)?;

    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &agg.diagnostics)? {
        return Ok(());
    }
    if agg.diagnostics.is_empty() {
        println!("doctor: no issues found");
    } else {
        let rows = agg
            .diagnostics
            .iter()
            .map(|d| {
                vec![
                    d.code().to_string(),
                    d.transaction_id().to_string(),
                    d.to_string(),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["Issue", "Transaction", "Detail"], rows));
    }
    Ok(())
}
