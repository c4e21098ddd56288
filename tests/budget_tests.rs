// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{NaiveDate, TimeZone, Utc};
use pocketledger::budget::{BudgetLevel, derive_budgets, status};
use pocketledger::commands::budgets::collect_alerts;
use pocketledger::currency::RateTable;
use pocketledger::ledger::aggregate;
use pocketledger::models::{BudgetRecord, Transaction, TxKind};
use pocketledger::throttle::NotificationThrottle;
use rust_decimal::Decimal;

fn d(s: &str) -> Decimal {
    s.parse().unwrap()
}

#[test]
fn threshold_boundaries() {
    assert_eq!(status(d("75"), d("100")).level, BudgetLevel::Warning);
    assert_eq!(status(d("74.999"), d("100")).level, BudgetLevel::OnTrack);
    assert_eq!(status(d("90"), d("100")).level, BudgetLevel::Critical);
    assert_eq!(status(d("89.99"), d("100")).level, BudgetLevel::Warning);
    assert_eq!(status(d("250"), d("100")).level, BudgetLevel::Critical);
}

#[test]
fn non_positive_limit_is_zero_percent() {
    let s = status(Decimal::ZERO, Decimal::ZERO);
    assert_eq!(s.level, BudgetLevel::OnTrack);
    assert_eq!(s.percentage, Decimal::ZERO);
    assert_eq!(status(d("500"), d("-10")).level, BudgetLevel::OnTrack);
}

#[test]
fn status_carries_color_and_message() {
    let s = status(d("95"), d("100"));
    assert_eq!(s.percentage, d("95"));
    assert_eq!(s.color, BudgetLevel::Critical.color());
    assert_eq!(s.message, BudgetLevel::Critical.message());
    assert_ne!(
        BudgetLevel::OnTrack.color(),
        BudgetLevel::Warning.color()
    );
}

fn august_spend() -> Vec<Transaction> {
    let date = NaiveDate::from_ymd_opt(2025, 8, 10).unwrap();
    vec![
        Transaction::new(1, TxKind::Expense, d("9"), "EUR", "Card", date).category("Dining"),
        Transaction::new(2, TxKind::Expense, d("30"), "USD", "Cash", date).category("Dining"),
        Transaction::new(3, TxKind::Expense, d("20"), "USD", "Cash", date).category("Groceries"),
    ]
}

#[test]
fn budgets_take_spend_from_aggregation() {
    let rates = RateTable::new().with("EUR", "USD", d("1.5"));
    let agg = aggregate(&august_spend(), "USD", &rates);
    let records = vec![
        BudgetRecord {
            id: 1,
            category: "Dining".into(),
            limit_amount: d("50"),
        },
        BudgetRecord {
            id: 2,
            category: "Groceries".into(),
            limit_amount: d("100"),
        },
        BudgetRecord {
            id: 3,
            category: "Travel".into(),
            limit_amount: d("400"),
        },
    ];
    let budgets = derive_budgets(&records, &agg);
    // 9 EUR * 1.5 + 30 = 43.5 of 50 -> 87%
    assert_eq!(budgets[0].current_spend, d("43.5"));
    assert_eq!(budgets[0].status.level, BudgetLevel::Warning);
    assert_eq!(budgets[1].current_spend, d("20"));
    assert_eq!(budgets[1].status.level, BudgetLevel::OnTrack);
    assert_eq!(budgets[2].current_spend, Decimal::ZERO);
}

#[test]
fn alerts_only_for_budgets_over_threshold() {
    let agg = aggregate(&august_spend(), "USD", &RateTable::new());
    let records = vec![
        BudgetRecord {
            id: 1,
            category: "Dining".into(),
            limit_amount: d("40"),
        },
        BudgetRecord {
            id: 2,
            category: "Groceries".into(),
            limit_amount: d("100"),
        },
    ];
    let budgets = derive_budgets(&records, &agg);
    let throttle = NotificationThrottle::default();
    let now = Utc.with_ymd_and_hms(2025, 8, 10, 12, 0, 0).unwrap();

    let first = collect_alerts(&budgets, &throttle, now);
    assert_eq!(first.len(), 1);
    assert!(first[0].starts_with("Dining"));

    // same instant: still cooling down
    assert!(collect_alerts(&budgets, &throttle, now).is_empty());
}

#[test]
fn oversized_ratio_saturates_as_critical() {
    let s = status(d("100000000000000000000"), d("0.0000000001"));
    assert_eq!(s.percentage, Decimal::MAX);
    assert_eq!(s.level, BudgetLevel::Critical);
}

#[test]
fn budget_category_matches_regardless_of_case() {
    let date = NaiveDate::from_ymd_opt(2025, 8, 10).unwrap();
    let txs = vec![
        Transaction::new(1, TxKind::Expense, d("60"), "USD", "Cash", date).category("Food"),
        Transaction::new(2, TxKind::Expense, d("30"), "USD", "Cash", date).category(" FOOD "),
    ];
    let agg = aggregate(&txs, "USD", &RateTable::new());
    assert_eq!(agg.category_spend.len(), 1);
    assert_eq!(agg.category_spend.get("Food"), Some(&d("90")));

    let records = vec![BudgetRecord {
        id: 1,
        category: "food".into(),
        limit_amount: d("100"),
    }];
    let budgets = derive_budgets(&records, &agg);
    assert_eq!(budgets[0].current_spend, d("90"));
    assert_eq!(budgets[0].status.level, BudgetLevel::Critical);
}
