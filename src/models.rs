// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::budget::BudgetStatus;
use crate::error::LedgerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxKind {
    Income,
    Expense,
    Transfer,
}

impl TxKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxKind::Income => "income",
            TxKind::Expense => "expense",
            TxKind::Transfer => "transfer",
        }
    }
}

impl fmt::Display for TxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TxKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(TxKind::Income),
            "expense" => Ok(TxKind::Expense),
            "transfer" => Ok(TxKind::Transfer),
            _ => Err(LedgerError::InvalidKind(s.to_string())),
        }
    }
}

/// A single ledger entry. `amount` is a magnitude; `kind` carries the sign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub amount: Decimal,
    pub currency: String,
    pub kind: TxKind,
    pub category: String,
    pub account: String,
    pub to_account: Option<String>, // transfers only
    pub note: String,
    pub date: NaiveDate,
}

impl Transaction {
    pub fn new(
        id: i64,
        kind: TxKind,
        amount: Decimal,
        currency: &str,
        account: &str,
        date: NaiveDate,
    ) -> Self {
        Self {
            id,
            amount,
            currency: currency.to_uppercase(),
            kind,
            category: String::new(),
            account: account.to_string(),
            to_account: None,
            note: String::new(),
            date,
        }
    }

    pub fn category(mut self, category: &str) -> Self {
        self.category = category.to_string();
        self
    }

    pub fn note(mut self, note: &str) -> Self {
        self.note = note.to_string();
        self
    }

    pub fn to_account(mut self, account: &str) -> Self {
        self.to_account = Some(account.to_string());
        self
    }
}

/// A stored spending limit for one category, in display currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetRecord {
    pub id: i64,
    pub category: String,
    pub limit_amount: Decimal,
}

/// A budget record with its spend derived from the ledger.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Budget {
    pub id: i64,
    pub category: String,
    pub limit_amount: Decimal,
    pub current_spend: Decimal,
    pub status: BudgetStatus,
}
