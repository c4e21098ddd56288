// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Ledger aggregation: account balances, income/expense totals and per
//! category spend, all normalized to a single display currency.
//!
//! Every pass recomputes from scratch. Bad input never aborts a pass; it is
//! recorded as a [`Diagnostic`] on the returned [`Aggregation`].

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::currency::{RateTable, convert_checked};
use crate::error::{Diagnostic, LedgerError};
use crate::models::{Transaction, TxKind};

pub const UNCATEGORIZED: &str = "(uncategorized)";

/// The five fixed balance buckets. Declaration order is display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Account {
    #[serde(rename = "Credit Card")]
    CreditCard,
    Cash,
    Savings,
    #[serde(rename = "Bank Account")]
    BankAccount,
    Investment,
}

// Matched case-insensitively after trimming.
const ACCOUNT_ALIASES: &[(&str, Account)] = &[
    ("credit card", Account::CreditCard),
    ("card", Account::CreditCard),
    ("cash", Account::Cash),
    ("savings", Account::Savings),
    ("bank account", Account::BankAccount),
    ("bank", Account::BankAccount),
    ("investment", Account::Investment),
];

impl Account {
    pub const ALL: [Account; 5] = [
        Account::CreditCard,
        Account::Cash,
        Account::Savings,
        Account::BankAccount,
        Account::Investment,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Account::CreditCard => "Credit Card",
            Account::Cash => "Cash",
            Account::Savings => "Savings",
            Account::BankAccount => "Bank Account",
            Account::Investment => "Investment",
        }
    }

    /// Resolves a canonical name or alias. Unknown names yield `None`.
    pub fn lookup(name: &str) -> Option<Account> {
        let needle = name.trim();
        ACCOUNT_ALIASES
            .iter()
            .find(|(alias, _)| alias.eq_ignore_ascii_case(needle))
            .map(|(_, account)| *account)
    }

    /// Like [`Account::lookup`], but folds unknown names into `Cash`.
    pub fn normalize(name: &str) -> Account {
        Self::lookup(name).unwrap_or(Account::Cash)
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

static TRANSFER_NOTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bfrom\s+([a-z][a-z ]*?)\s+to\s+([a-z][a-z ]*)").expect("valid regex")
});

/// Extracts `(from, to)` from a note shaped like `from <X> to <Y>`.
///
/// `X` and `Y` may contain only ASCII letters and spaces; the keywords are
/// case-insensitive. Names are returned trimmed and unresolved.
pub fn parse_transfer(note: &str) -> Option<(String, String)> {
    let caps = TRANSFER_NOTE.captures(note)?;
    let from = caps.get(1)?.as_str().trim();
    let to = caps.get(2)?.as_str().trim();
    if from.is_empty() || to.is_empty() {
        return None;
    }
    Some((from.to_string(), to.to_string()))
}

/// Parses a stored amount; anything unparsable contributes zero.
pub fn parse_amount_lenient(transaction_id: i64, raw: &str) -> (Decimal, Option<Diagnostic>) {
    match raw.trim().parse::<Decimal>() {
        Ok(v) => (v, None),
        Err(_) => {
            debug!(transaction_id, raw, "unparsable amount counted as zero");
            (
                Decimal::ZERO,
                Some(Diagnostic::InvalidAmount {
                    transaction_id,
                    raw: raw.to_string(),
                }),
            )
        }
    }
}

fn transfer_route(tx: &Transaction) -> Result<(Account, Account), Diagnostic> {
    let (from, to) = match parse_transfer(&tx.note) {
        Some(pair) => pair,
        None => match tx.to_account.as_deref() {
            Some(to) => (tx.account.clone(), to.to_string()),
            None => {
                return Err(Diagnostic::UnparsableTransfer {
                    transaction_id: tx.id,
                    note: tx.note.clone(),
                });
            }
        },
    };
    match (Account::lookup(&from), Account::lookup(&to)) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(Diagnostic::UnknownTransferAccount {
            transaction_id: tx.id,
            from,
            to,
        }),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregation {
    pub display_currency: String,
    pub account_balances: BTreeMap<Account, Decimal>,
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub net_balance: Decimal,
    pub category_spend: BTreeMap<String, Decimal>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Aggregation {
    pub fn balance(&self, account: Account) -> Decimal {
        self.account_balances
            .get(&account)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Spend for `category`, matched trimmed and case-insensitively.
    pub fn spent_in(&self, category: &str) -> Decimal {
        let wanted = category_key(category);
        self.category_spend
            .iter()
            .find(|(name, _)| category_key(name) == wanted)
            .map(|(_, v)| *v)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn balance_sum(&self) -> Decimal {
        self.account_balances
            .values()
            .fold(Decimal::ZERO, |acc, v| acc.saturating_add(*v))
    }
}

/// Folding key for category names: trimmed and lower-cased.
pub fn category_key(name: &str) -> String {
    name.trim().to_lowercase()
}

struct Totals {
    account_balances: BTreeMap<Account, Decimal>,
    category_spend: BTreeMap<String, Decimal>,
    // fold key -> first spelling seen, which names the bucket
    category_names: HashMap<String, String>,
    total_income: Decimal,
    total_expense: Decimal,
}

impl Totals {
    fn new() -> Self {
        Self {
            account_balances: Account::ALL.iter().map(|a| (*a, Decimal::ZERO)).collect(),
            category_spend: BTreeMap::new(),
            category_names: HashMap::new(),
            total_income: Decimal::ZERO,
            total_expense: Decimal::ZERO,
        }
    }

    fn balance(&self, account: Account) -> Decimal {
        self.account_balances
            .get(&account)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    fn category_name(&self, raw: &str) -> String {
        let raw = raw.trim();
        if raw.is_empty() {
            return UNCATEGORIZED.to_string();
        }
        self.category_names
            .get(&category_key(raw))
            .cloned()
            .unwrap_or_else(|| raw.to_string())
    }

    /// Applies one posting. Returns `None`, leaving every total untouched,
    /// when any updated value would not fit in a `Decimal`.
    fn apply(
        &mut self,
        tx: &Transaction,
        route: Option<(Account, Account)>,
        amount: Decimal,
    ) -> Option<()> {
        match (tx.kind, route) {
            (TxKind::Expense, _) => {
                let account = Account::normalize(&tx.account);
                let category = self.category_name(&tx.category);
                let balance = self.balance(account).checked_sub(amount)?;
                let expense = self.total_expense.checked_add(amount)?;
                self.total_income.checked_sub(expense)?;
                let spent = self
                    .category_spend
                    .get(&category)
                    .copied()
                    .unwrap_or(Decimal::ZERO)
                    .checked_add(amount)?;

                self.account_balances.insert(account, balance);
                self.total_expense = expense;
                self.category_names
                    .entry(category_key(&category))
                    .or_insert_with(|| category.clone());
                self.category_spend.insert(category, spent);
            }
            (TxKind::Income, _) => {
                let account = Account::normalize(&tx.account);
                let balance = self.balance(account).checked_add(amount)?;
                let income = self.total_income.checked_add(amount)?;
                income.checked_sub(self.total_expense)?;

                self.account_balances.insert(account, balance);
                self.total_income = income;
            }
            (TxKind::Transfer, Some((from, to))) => {
                let debited = self.balance(from).checked_sub(amount)?;
                let before = if from == to { debited } else { self.balance(to) };
                let credited = before.checked_add(amount)?;

                self.account_balances.insert(from, debited);
                self.account_balances.insert(to, credited);
            }
            (TxKind::Transfer, None) => {}
        }
        Some(())
    }
}

/// Aggregates `transactions` into balances and totals in `display_currency`.
///
/// Categories are folded case-insensitively; the first spelling seen names
/// the bucket. A transaction whose amount would overflow any total is
/// skipped whole and reported as [`Diagnostic::Overflow`].
pub fn aggregate<'a, I>(transactions: I, display_currency: &str, rates: &RateTable) -> Aggregation
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let display_currency = display_currency.trim().to_uppercase();
    let mut totals = Totals::new();
    let mut diagnostics = Vec::new();

    for tx in transactions {
        let route = match tx.kind {
            TxKind::Transfer => match transfer_route(tx) {
                Ok(route) => Some(route),
                Err(diag) => {
                    debug!(transaction_id = tx.id, %diag, "transfer dropped");
                    diagnostics.push(diag);
                    continue;
                }
            },
            _ => None,
        };

        let amount = match convert_checked(tx.amount, &tx.currency, &display_currency, rates) {
            Ok(v) => v,
            Err(LedgerError::Overflow { .. }) => {
                debug!(transaction_id = tx.id, "converted amount overflows");
                diagnostics.push(Diagnostic::Overflow {
                    transaction_id: tx.id,
                });
                continue;
            }
            Err(_) => {
                debug!(
                    transaction_id = tx.id,
                    from = %tx.currency,
                    to = %display_currency,
                    "missing rate, using 1.0"
                );
                diagnostics.push(Diagnostic::MissingRate {
                    transaction_id: tx.id,
                    from: tx.currency.trim().to_uppercase(),
                    to: display_currency.clone(),
                });
                tx.amount
            }
        };

        if totals.apply(tx, route, amount).is_none() {
            debug!(transaction_id = tx.id, %amount, "posting overflows totals");
            diagnostics.push(Diagnostic::Overflow {
                transaction_id: tx.id,
            });
        }
    }

    // `apply` keeps income - expense representable
    let net_balance = totals
        .total_income
        .checked_sub(totals.total_expense)
        .unwrap_or(Decimal::MAX);
    Aggregation {
        display_currency,
        account_balances: totals.account_balances,
        total_income: totals.total_income,
        total_expense: totals.total_expense,
        net_balance,
        category_spend: totals.category_spend,
        diagnostics,
    }
}

/// Time window used to select transactions before aggregating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Period {
    All,
    Month { year: i32, month: u32 },
    Range { start: NaiveDate, end: NaiveDate },
}

impl Period {
    /// Parses `YYYY-MM`.
    pub fn month(s: &str) -> Option<Period> {
        let first = NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d").ok()?;
        Some(Period::Month {
            year: first.year(),
            month: first.month(),
        })
    }

    /// Inclusive on both ends.
    pub fn contains(&self, date: NaiveDate) -> bool {
        match *self {
            Period::All => true,
            Period::Month { year, month } => date.year() == year && date.month() == month,
            Period::Range { start, end } => start <= date && date <= end,
        }
    }
}

pub fn aggregate_in(
    period: Period,
    transactions: &[Transaction],
    display_currency: &str,
    rates: &RateTable,
) -> Aggregation {
    aggregate(
        transactions.iter().filter(|tx| period.contains(tx.date)),
        display_currency,
        rates,
    )
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthSummary {
    pub month: String,
    pub income: Decimal,
    pub expense: Decimal,
    pub net: Decimal,
}

/// Income, expense and net per calendar month, newest first.
pub fn monthly_summaries(
    transactions: &[Transaction],
    display_currency: &str,
    rates: &RateTable,
) -> Vec<MonthSummary> {
    let mut by_month: BTreeMap<String, Vec<&Transaction>> = BTreeMap::new();
    for tx in transactions {
        by_month
            .entry(tx.date.format("%Y-%m").to_string())
            .or_default()
            .push(tx);
    }
    by_month
        .into_iter()
        .rev()
        .map(|(month, txs)| {
            let agg = aggregate(txs, display_currency, rates);
            MonthSummary {
                month,
                income: agg.total_income,
                expense: agg.total_expense,
                net: agg.net_balance,
            }
        })
        .collect()
}
