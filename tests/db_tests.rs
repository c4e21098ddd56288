// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use pocketledger::commands::reports::aggregate_stored;
use pocketledger::error::Diagnostic;
use pocketledger::ledger::{Account, Period};
use pocketledger::models::{Transaction, TxKind};
use pocketledger::{db, utils};
use rusqlite::params;
use rust_decimal::Decimal;
use tempfile::NamedTempFile;

fn d(s: &str) -> Decimal {
    s.parse().unwrap()
}

#[test]
fn on_disk_database_round_trips_ledger_state() {
    let file = NamedTempFile::new().unwrap();
    {
        let conn = db::open_at(file.path()).unwrap();
        utils::set_display_currency(&conn, "USD").unwrap();
        db::set_rate(&conn, "eur", "usd", d("1.1")).unwrap();
        db::set_budget(&conn, "Food", d("100")).unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 8, 3).unwrap();
        db::insert_transaction(
            &conn,
            &Transaction::new(0, TxKind::Expense, d("50"), "EUR", "Card", date).category("Food"),
        )
        .unwrap();
    }

    let conn = db::open_at(file.path()).unwrap();
    assert_eq!(utils::get_display_currency(&conn).unwrap(), "USD");
    assert_eq!(db::load_rates(&conn).unwrap().get("EUR", "USD"), Some(d("1.1")));
    let budgets = db::load_budgets(&conn).unwrap();
    assert_eq!(budgets.len(), 1);
    assert_eq!(budgets[0].limit_amount, d("100"));

    let agg = aggregate_stored(&conn, Period::All, "USD").unwrap();
    assert_eq!(agg.balance(Account::CreditCard), d("-55"));
    assert_eq!(agg.spent_in("Food"), d("55"));
}

#[test]
fn display_currency_defaults_to_usd() {
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    assert_eq!(utils::get_display_currency(&conn).unwrap(), "USD");
}

#[test]
fn set_budget_replaces_limit_in_place() {
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    let a = db::set_budget(&conn, "Food", d("100")).unwrap();
    let b = db::set_budget(&conn, "Food", d("250")).unwrap();
    assert_eq!(a, b);
    assert_eq!(db::load_budgets(&conn).unwrap()[0].limit_amount, d("250"));
    assert!(db::remove_budget(&conn, "Food").unwrap());
    assert!(db::load_budgets(&conn).unwrap().is_empty());
}

#[test]
fn corrupt_amount_counts_as_zero_and_is_reported() {
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn.execute(
        "INSERT INTO transactions(date, kind, amount, currency, account) VALUES (?1,'expense',?2,'USD','Cash')",
        params!["2025-08-01", "twelve"],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO transactions(date, kind, amount, currency, account) VALUES (?1,'income','40','USD','Cash')",
        params!["2025-08-02"],
    )
    .unwrap();

    let agg = aggregate_stored(&conn, Period::All, "USD").unwrap();
    assert_eq!(agg.total_expense, Decimal::ZERO);
    assert_eq!(agg.balance(Account::Cash), d("40"));
    assert!(matches!(
        agg.diagnostics.as_slice(),
        [Diagnostic::InvalidAmount { transaction_id: 1, .. }]
    ));

    // outside the window the bad row is not mentioned
    let july = Period::month("2025-07").unwrap();
    assert!(aggregate_stored(&conn, july, "USD").unwrap().diagnostics.is_empty());
}

#[test]
fn unreadable_date_skips_the_row_only() {
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn.execute(
        "INSERT INTO transactions(date, kind, amount, currency, account) VALUES (?1,'income','40','USD','Cash')",
        params!["2025-08-01"],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO transactions(date, kind, amount, currency, account) VALUES (?1,'expense','5','USD','Cash')",
        params!["08/02/2025"],
    )
    .unwrap();

    let loaded = db::load_transactions(&conn).unwrap();
    assert_eq!(loaded.transactions.len(), 1);

    let agg = aggregate_stored(&conn, Period::All, "USD").unwrap();
    assert_eq!(agg.balance(Account::Cash), d("40"));
    assert_eq!(
        agg.diagnostics,
        vec![Diagnostic::InvalidDate {
            transaction_id: 2,
            raw: "08/02/2025".into()
        }]
    );
    // undated rows are reported for every window
    let august = Period::month("2025-08").unwrap();
    assert_eq!(aggregate_stored(&conn, august, "USD").unwrap().diagnostics.len(), 1);

    assert_eq!(db::get_transaction(&conn, 1).unwrap().unwrap().amount, d("40"));
    assert!(db::get_transaction(&conn, 2).is_err());
    assert!(db::get_transaction(&conn, 3).unwrap().is_none());
}

#[test]
fn budget_categories_are_unique_ignoring_case() {
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    let a = db::set_budget(&conn, "Food", d("100")).unwrap();
    let b = db::set_budget(&conn, "food", d("120")).unwrap();
    assert_eq!(a, b);
    assert_eq!(db::load_budgets(&conn).unwrap().len(), 1);
    assert!(db::remove_budget(&conn, "FOOD").unwrap());
}
