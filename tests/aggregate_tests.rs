// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use pocketledger::currency::RateTable;
use pocketledger::error::Diagnostic;
use pocketledger::ledger::{
    Account, Period, aggregate, aggregate_in, monthly_summaries, parse_amount_lenient,
    parse_transfer,
};
use pocketledger::models::{Transaction, TxKind};
use rust_decimal::Decimal;

fn d(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn day(y: i32, m: u32, dd: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, dd).unwrap()
}

fn tx(id: i64, kind: TxKind, amount: &str, ccy: &str, account: &str) -> Transaction {
    Transaction::new(id, kind, d(amount), ccy, account, day(2025, 8, 10))
}

#[test]
fn expense_on_card_hits_credit_card() {
    let txs = vec![tx(1, TxKind::Expense, "100", "USD", "Card").category("Food")];
    let agg = aggregate(&txs, "USD", &RateTable::new());
    assert_eq!(agg.balance(Account::CreditCard), d("-100"));
    assert_eq!(agg.total_expense, d("100"));
    assert_eq!(agg.total_income, Decimal::ZERO);
    assert_eq!(agg.spent_in("Food"), d("100"));
    assert!(agg.diagnostics.is_empty());
}

#[test]
fn foreign_income_is_converted() {
    let txs = vec![tx(1, TxKind::Income, "50", "EUR", "Cash")];
    let rates = RateTable::new().with("EUR", "USD", d("1.1"));
    let agg = aggregate(&txs, "USD", &rates);
    assert_eq!(agg.balance(Account::Cash), d("55"));
    assert_eq!(agg.total_income, d("55"));
}

#[test]
fn transfer_note_moves_between_accounts() {
    let txs = vec![tx(1, TxKind::Transfer, "200", "USD", "Cash").note("from Cash to Bank Account")];
    let agg = aggregate(&txs, "USD", &RateTable::new());
    assert_eq!(agg.balance(Account::Cash), d("-200"));
    assert_eq!(agg.balance(Account::BankAccount), d("200"));
    assert_eq!(agg.total_income, Decimal::ZERO);
    assert_eq!(agg.total_expense, Decimal::ZERO);
    assert_eq!(agg.net_balance, Decimal::ZERO);
}

#[test]
fn unparsable_transfer_is_dropped_and_reported() {
    let txs = vec![tx(7, TxKind::Transfer, "200", "USD", "Cash").note("moved some money")];
    let agg = aggregate(&txs, "USD", &RateTable::new());
    for account in Account::ALL {
        assert_eq!(agg.balance(account), Decimal::ZERO);
    }
    assert_eq!(agg.net_balance, Decimal::ZERO);
    assert_eq!(
        agg.diagnostics,
        vec![Diagnostic::UnparsableTransfer {
            transaction_id: 7,
            note: "moved some money".into()
        }]
    );
}

#[test]
fn transfer_to_unknown_account_is_dropped() {
    let txs = vec![tx(3, TxKind::Transfer, "10", "USD", "Cash").note("from Cash to Wallet")];
    let agg = aggregate(&txs, "USD", &RateTable::new());
    assert_eq!(agg.balance(Account::Cash), Decimal::ZERO);
    assert!(matches!(
        agg.diagnostics.as_slice(),
        [Diagnostic::UnknownTransferAccount { transaction_id: 3, .. }]
    ));
}

#[test]
fn structured_destination_used_when_note_is_free_text() {
    let txs = vec![
        tx(1, TxKind::Transfer, "40", "USD", "Bank")
            .to_account("Savings")
            .note("rainy day"),
    ];
    let agg = aggregate(&txs, "USD", &RateTable::new());
    assert_eq!(agg.balance(Account::BankAccount), d("-40"));
    assert_eq!(agg.balance(Account::Savings), d("40"));
}

#[test]
fn unknown_accounts_fold_into_cash() {
    let txs = vec![
        tx(1, TxKind::Income, "30", "USD", "Piggy bank"),
        tx(2, TxKind::Expense, "5", "USD", "bank"),
    ];
    let agg = aggregate(&txs, "USD", &RateTable::new());
    assert_eq!(agg.balance(Account::Cash), d("30"));
    assert_eq!(agg.balance(Account::BankAccount), d("-5"));
}

#[test]
fn all_buckets_present_even_when_empty() {
    let agg = aggregate(&Vec::<Transaction>::new(), "USD", &RateTable::new());
    assert_eq!(agg.account_balances.len(), 5);
    let names: Vec<&str> = agg.account_balances.keys().map(|a| a.name()).collect();
    assert_eq!(
        names,
        ["Credit Card", "Cash", "Savings", "Bank Account", "Investment"]
    );
}

#[test]
fn missing_rate_is_reported_not_fatal() {
    let txs = vec![tx(9, TxKind::Expense, "20", "JPY", "Cash")];
    let agg = aggregate(&txs, "USD", &RateTable::new());
    assert_eq!(agg.total_expense, d("20"));
    assert_eq!(
        agg.diagnostics,
        vec![Diagnostic::MissingRate {
            transaction_id: 9,
            from: "JPY".into(),
            to: "USD".into()
        }]
    );
}

fn mixed_ledger() -> Vec<Transaction> {
    vec![
        tx(1, TxKind::Income, "2500", "USD", "Bank"),
        tx(2, TxKind::Expense, "42.17", "EUR", "Card").category("Dining"),
        tx(3, TxKind::Transfer, "300", "USD", "Bank").note("FROM bank account TO savings"),
        tx(4, TxKind::Expense, "1200", "INR", "Cash").category("Groceries"),
        tx(5, TxKind::Income, "75.5", "EUR", "Investment"),
        tx(6, TxKind::Transfer, "60", "EUR", "Cash").note("from Credit Card to Cash"),
        tx(7, TxKind::Expense, "9.99", "USD", "Netflix").category("Subscriptions"),
    ]
}

fn mixed_rates() -> RateTable {
    RateTable::new()
        .with("EUR", "USD", d("1.0873"))
        .with("INR", "USD", d("0.01204"))
}

#[test]
fn balances_sum_to_net() {
    let agg = aggregate(&mixed_ledger(), "USD", &mixed_rates());
    assert!(agg.diagnostics.is_empty());
    assert_eq!(agg.balance_sum(), agg.net_balance);
    assert_eq!(agg.net_balance, agg.total_income - agg.total_expense);
}

#[test]
fn aggregation_is_repeatable_and_order_free() {
    let txs = mixed_ledger();
    let rates = mixed_rates();
    let a = aggregate(&txs, "USD", &rates);
    let b = aggregate(&txs, "USD", &rates);
    assert_eq!(a, b);

    let mut reversed = txs.clone();
    reversed.reverse();
    let c = aggregate(&reversed, "USD", &rates);
    assert_eq!(a.account_balances, c.account_balances);
    assert_eq!(a.total_income, c.total_income);
    assert_eq!(a.total_expense, c.total_expense);
}

#[test]
fn period_filters_by_month() {
    let txs = vec![
        Transaction::new(1, TxKind::Expense, d("10"), "USD", "Cash", day(2025, 7, 31)),
        Transaction::new(2, TxKind::Expense, d("20"), "USD", "Cash", day(2025, 8, 1)),
        Transaction::new(3, TxKind::Income, d("5"), "USD", "Cash", day(2025, 8, 31)),
    ];
    let aug = Period::month("2025-08").unwrap();
    let agg = aggregate_in(aug, &txs, "USD", &RateTable::new());
    assert_eq!(agg.total_expense, d("20"));
    assert_eq!(agg.total_income, d("5"));
    assert!(Period::month("2025-13").is_none());
}

#[test]
fn monthly_summaries_newest_first() {
    let txs = vec![
        Transaction::new(1, TxKind::Income, d("100"), "USD", "Bank", day(2025, 6, 3)),
        Transaction::new(2, TxKind::Expense, d("40"), "USD", "Card", day(2025, 6, 20)),
        Transaction::new(3, TxKind::Expense, d("15"), "USD", "Card", day(2025, 8, 2)),
    ];
    let rows = monthly_summaries(&txs, "USD", &RateTable::new());
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].month, "2025-08");
    assert_eq!(rows[0].net, d("-15"));
    assert_eq!(rows[1].month, "2025-06");
    assert_eq!(rows[1].net, d("60"));
}

#[test]
fn transfer_notes_parse() {
    assert_eq!(
        parse_transfer("from Cash to Bank Account"),
        Some(("Cash".into(), "Bank Account".into()))
    );
    assert_eq!(
        parse_transfer("Moved FROM credit card TO savings"),
        Some(("credit card".into(), "savings".into()))
    );
    assert_eq!(parse_transfer("from 123 to 456"), None);
    assert_eq!(parse_transfer("moved some money"), None);
}

#[test]
fn lenient_amounts_count_as_zero() {
    let (v, diag) = parse_amount_lenient(4, "abc");
    assert_eq!(v, Decimal::ZERO);
    assert!(matches!(diag, Some(Diagnostic::InvalidAmount { transaction_id: 4, .. })));
    let (v, diag) = parse_amount_lenient(5, " 12.50 ");
    assert_eq!(v, d("12.5"));
    assert!(diag.is_none());
}

#[test]
fn overflowing_posting_is_skipped_and_reported() {
    let big = "50000000000000000000000000000";
    let txs = vec![
        tx(1, TxKind::Income, big, "USD", "Cash"),
        tx(2, TxKind::Income, big, "USD", "Cash"),
        tx(3, TxKind::Expense, "10", "USD", "Cash"),
    ];
    let agg = aggregate(&txs, "USD", &RateTable::new());
    assert_eq!(agg.total_income, d(big));
    assert_eq!(agg.total_expense, d("10"));
    assert_eq!(agg.balance(Account::Cash), d(big) - d("10"));
    assert_eq!(agg.net_balance, agg.balance_sum());
    assert_eq!(agg.diagnostics, vec![Diagnostic::Overflow { transaction_id: 2 }]);
}

#[test]
fn overflowing_conversion_is_skipped_and_reported() {
    let txs = vec![
        tx(1, TxKind::Expense, "50000000000000000000000000000", "EUR", "Card"),
        tx(2, TxKind::Expense, "10", "EUR", "Card"),
    ];
    let rates = RateTable::new().with("EUR", "USD", d("2"));
    let agg = aggregate(&txs, "USD", &rates);
    assert_eq!(agg.total_expense, d("20"));
    assert_eq!(agg.balance(Account::CreditCard), d("-20"));
    assert_eq!(agg.diagnostics, vec![Diagnostic::Overflow { transaction_id: 1 }]);
}

#[test]
fn range_period_includes_both_ends() {
    let on = |id, date| {
        Transaction::new(id, TxKind::Expense, d("1"), "USD", "Cash", date).category("Misc")
    };
    let txs = vec![
        on(1, day(2025, 7, 31)),
        on(2, day(2025, 8, 1)),
        on(3, day(2025, 8, 15)),
        on(4, day(2025, 8, 31)),
        on(5, day(2025, 9, 1)),
    ];
    let period = Period::Range {
        start: day(2025, 8, 1),
        end: day(2025, 8, 31),
    };
    let agg = aggregate_in(period, &txs, "USD", &RateTable::new());
    assert_eq!(agg.total_expense, d("3"));
    assert!(period.contains(day(2025, 8, 1)));
    assert!(period.contains(day(2025, 8, 31)));
    assert!(!period.contains(day(2025, 9, 1)));
}

#[test]
fn transfer_with_missing_rate_still_moves_money() {
    let txs = vec![tx(4, TxKind::Transfer, "100", "EUR", "Bank").note("from Bank to Savings")];
    let agg = aggregate(&txs, "USD", &RateTable::new());
    assert_eq!(agg.balance(Account::BankAccount), d("-100"));
    assert_eq!(agg.balance(Account::Savings), d("100"));
    assert_eq!(agg.net_balance, Decimal::ZERO);
    assert_eq!(
        agg.diagnostics,
        vec![Diagnostic::MissingRate {
            transaction_id: 4,
            from: "EUR".into(),
            to: "USD".into()
        }]
    );
}

#[test]
fn transfer_note_wins_over_structured_destination() {
    let txs = vec![
        tx(5, TxKind::Transfer, "40", "USD", "Bank")
            .note("from Cash to Savings")
            .to_account("Investment"),
    ];
    let agg = aggregate(&txs, "USD", &RateTable::new());
    assert_eq!(agg.balance(Account::Cash), d("-40"));
    assert_eq!(agg.balance(Account::Savings), d("40"));
    assert_eq!(agg.balance(Account::Investment), Decimal::ZERO);
    assert_eq!(agg.balance(Account::BankAccount), Decimal::ZERO);
    assert!(agg.diagnostics.is_empty());
}
