// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;
use tracing::debug;

use crate::currency::RateTable;
use crate::error::Diagnostic;
use crate::ledger::parse_amount_lenient;
use crate::models::{BudgetRecord, Transaction, TxKind};

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Pocketledger", "pocketledger"));

pub const DB_ENV: &str = "POCKETLEDGER_DB";

pub fn db_path() -> Result<PathBuf> {
    if let Ok(p) = std::env::var(DB_ENV) {
        if !p.trim().is_empty() {
            return Ok(PathBuf::from(p));
        }
    }
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("pocketledger.sqlite"))
}

pub fn open_or_init() -> Result<Connection> {
    open_at(&db_path()?)
}

pub fn open_at(path: &Path) -> Result<Connection> {
    let conn =
        Connection::open(path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&conn)?;
    debug!(path = %path.display(), "database ready");
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS transactions(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        date TEXT NOT NULL,
        kind TEXT NOT NULL CHECK(kind IN ('income','expense','transfer')),
        amount TEXT NOT NULL,
        currency TEXT NOT NULL,
        category TEXT NOT NULL DEFAULT '',
        account TEXT NOT NULL,
        to_account TEXT,
        note TEXT NOT NULL DEFAULT '',
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date);

    -- limit_amount is in display currency
    CREATE TABLE IF NOT EXISTS budgets(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        category TEXT NOT NULL UNIQUE COLLATE NOCASE,
        limit_amount TEXT NOT NULL
    );

    -- 1 FROM = rate TO
    CREATE TABLE IF NOT EXISTS fx_rates(
        pair TEXT PRIMARY KEY,
        rate TEXT NOT NULL,
        updated_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    "#,
    )?;
    Ok(())
}

/// Transactions as stored, plus any amounts that could not be read.
#[derive(Debug, Default)]
pub struct LoadedTransactions {
    pub transactions: Vec<Transaction>,
    pub diagnostics: Vec<Diagnostic>,
}

const TX_COLUMNS: &str = "id, date, kind, amount, currency, category, account, to_account, note";

/// A stored row that may be unusable (`transaction: None`) and may carry a
/// diagnostic either way.
struct RowRead {
    transaction: Option<Transaction>,
    diagnostic: Option<Diagnostic>,
}

fn read_row(r: &rusqlite::Row<'_>) -> Result<RowRead> {
    let id: i64 = r.get(0)?;
    let d: String = r.get(1)?;
    let kind_s: String = r.get(2)?;
    let amount_s: String = r.get(3)?;
    let Ok(date) = chrono::NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d") else {
        debug!(transaction_id = id, raw = %d, "unreadable date, row skipped");
        return Ok(RowRead {
            transaction: None,
            diagnostic: Some(Diagnostic::InvalidDate {
                transaction_id: id,
                raw: d,
            }),
        });
    };
    let kind = kind_s
        .parse::<TxKind>()
        .with_context(|| format!("Transaction {}", id))?;
    let (amount, diagnostic) = parse_amount_lenient(id, &amount_s);
    Ok(RowRead {
        transaction: Some(Transaction {
            id,
            amount,
            currency: r.get(4)?,
            kind,
            category: r.get(5)?,
            account: r.get(6)?,
            to_account: r.get(7)?,
            note: r.get(8)?,
            date,
        }),
        diagnostic,
    })
}

/// Loads every transaction. Rows with an unreadable date are left out and
/// reported; unreadable amounts load as zero and are reported.
pub fn load_transactions(conn: &Connection) -> Result<LoadedTransactions> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM transactions ORDER BY date, id",
        TX_COLUMNS
    ))?;
    let mut rows = stmt.query([])?;
    let mut out = LoadedTransactions::default();
    while let Some(r) = rows.next()? {
        let read = read_row(r)?;
        out.diagnostics.extend(read.diagnostic);
        out.transactions.extend(read.transaction);
    }
    Ok(out)
}

/// Fetches one row. A row whose date cannot be read is an error here, since
/// there is no transaction to hand back.
pub fn get_transaction(conn: &Connection, id: i64) -> Result<Option<Transaction>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM transactions WHERE id=?1",
        TX_COLUMNS
    ))?;
    let mut rows = stmt.query(params![id])?;
    let Some(r) = rows.next()? else {
        return Ok(None);
    };
    let read = read_row(r)?;
    match (read.transaction, read.diagnostic) {
        (Some(tx), _) => Ok(Some(tx)),
        (None, Some(diag)) => Err(diag.into()),
        (None, None) => Ok(None),
    }
}

pub fn insert_transaction(conn: &Connection, tx: &Transaction) -> Result<i64> {
    conn.execute(
        "INSERT INTO transactions(date, kind, amount, currency, category, account, to_account, note)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            tx.date.to_string(),
            tx.kind.as_str(),
            tx.amount.to_string(),
            tx.currency,
            tx.category,
            tx.account,
            tx.to_account,
            tx.note
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Overwrites the row at `tx.id`. Returns false when no such row exists.
pub fn update_transaction(conn: &Connection, tx: &Transaction) -> Result<bool> {
    let n = conn.execute(
        "UPDATE transactions SET date=?2, kind=?3, amount=?4, currency=?5, category=?6,
         account=?7, to_account=?8, note=?9 WHERE id=?1",
        params![
            tx.id,
            tx.date.to_string(),
            tx.kind.as_str(),
            tx.amount.to_string(),
            tx.currency,
            tx.category,
            tx.account,
            tx.to_account,
            tx.note
        ],
    )?;
    Ok(n > 0)
}

pub fn delete_transaction(conn: &Connection, id: i64) -> Result<bool> {
    let n = conn.execute("DELETE FROM transactions WHERE id=?1", params![id])?;
    Ok(n > 0)
}

pub fn load_rates(conn: &Connection) -> Result<RateTable> {
    let mut stmt = conn.prepare("SELECT pair, rate FROM fx_rates ORDER BY pair")?;
    let rows = stmt.query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?)))?;
    let mut entries = Vec::new();
    for row in rows {
        let (pair, rate_s) = row?;
        let rate = rate_s
            .parse::<Decimal>()
            .with_context(|| format!("Invalid rate '{}' for {}", rate_s, pair))?;
        entries.push((pair, rate));
    }
    Ok(entries.into_iter().collect())
}

pub fn set_rate(conn: &Connection, from: &str, to: &str, rate: Decimal) -> Result<()> {
    conn.execute(
        "INSERT INTO fx_rates(pair, rate) VALUES (?1, ?2)
         ON CONFLICT(pair) DO UPDATE SET rate=excluded.rate, updated_at=datetime('now')",
        params![crate::currency::pair_key(from, to), rate.to_string()],
    )?;
    Ok(())
}

pub fn remove_rate(conn: &Connection, from: &str, to: &str) -> Result<bool> {
    let n = conn.execute(
        "DELETE FROM fx_rates WHERE pair=?1",
        params![crate::currency::pair_key(from, to)],
    )?;
    Ok(n > 0)
}

pub fn load_budgets(conn: &Connection) -> Result<Vec<BudgetRecord>> {
    let mut stmt =
        conn.prepare("SELECT id, category, limit_amount FROM budgets ORDER BY category")?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, i64>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
        ))
    })?;
    let mut out = Vec::new();
    for row in rows {
        let (id, category, limit_s) = row?;
        let limit_amount = limit_s
            .parse::<Decimal>()
            .with_context(|| format!("Invalid budget amount '{}' for {}", limit_s, category))?;
        out.push(BudgetRecord {
            id,
            category,
            limit_amount,
        });
    }
    Ok(out)
}

/// Creates or replaces the limit for `category`, returning the budget id.
pub fn set_budget(conn: &Connection, category: &str, limit: Decimal) -> Result<i64> {
    conn.execute(
        "INSERT INTO budgets(category, limit_amount) VALUES (?1, ?2)
         ON CONFLICT(category) DO UPDATE SET limit_amount=excluded.limit_amount",
        params![category, limit.to_string()],
    )?;
    let id: Option<i64> = conn
        .query_row(
            "SELECT id FROM budgets WHERE category=?1",
            params![category],
            |r| r.get(0),
        )
        .optional()?;
    id.with_context(|| format!("Budget for '{}' missing after write", category))
}

pub fn remove_budget(conn: &Connection, category: &str) -> Result<bool> {
    let n = conn.execute("DELETE FROM budgets WHERE category=?1", params![category])?;
    Ok(n > 0)
}
