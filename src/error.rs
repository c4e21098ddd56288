// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use serde::Serialize;
use thiserror::Error;

/// Hard failures raised while building core values from untrusted input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("no {from}_{to} rate in table")]
    MissingRate { from: String, to: String },
    #[error("invalid transaction type '{0}', expected income|expense|transfer")]
    InvalidKind(String),
    #[error("invalid currency code '{0}'")]
    InvalidCurrency(String),
    #[error("invalid amount '{0}'")]
    InvalidAmount(String),
    #[error("{amount} {from} does not fit after conversion to {to}")]
    Overflow {
        amount: String,
        from: String,
        to: String,
    },
}

/// Soft problems recovered inside an aggregation pass.
///
/// None of these abort the pass; they are collected on the result so the
/// caller can show the user what was degraded or skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    #[error("transaction {transaction_id}: no {from}_{to} rate, converted at 1.0")]
    MissingRate {
        transaction_id: i64,
        from: String,
        to: String,
    },
    #[error("transaction {transaction_id}: transfer note '{note}' not understood, skipped")]
    UnparsableTransfer { transaction_id: i64, note: String },
    #[error("transaction {transaction_id}: transfer {from} -> {to} names an unknown account, skipped")]
    UnknownTransferAccount {
        transaction_id: i64,
        from: String,
        to: String,
    },
    #[error("transaction {transaction_id}: amount '{raw}' is not a number, counted as 0")]
    InvalidAmount { transaction_id: i64, raw: String },
    #[error("transaction {transaction_id}: date '{raw}' is not YYYY-MM-DD, skipped")]
    InvalidDate { transaction_id: i64, raw: String },
    #[error("transaction {transaction_id}: amount overflows the running totals, skipped")]
    Overflow { transaction_id: i64 },
}

impl Diagnostic {
    pub fn transaction_id(&self) -> i64 {
        match self {
            Diagnostic::MissingRate { transaction_id, .. }
            | Diagnostic::UnparsableTransfer { transaction_id, .. }
            | Diagnostic::UnknownTransferAccount { transaction_id, .. }
            | Diagnostic::InvalidAmount { transaction_id, .. }
            | Diagnostic::InvalidDate { transaction_id, .. }
            | Diagnostic::Overflow { transaction_id } => *transaction_id,
        }
    }

    /// Short machine-friendly tag, used by `doctor`.
    pub fn code(&self) -> &'static str {
        match self {
            Diagnostic::MissingRate { .. } => "missing_fx",
            Diagnostic::UnparsableTransfer { .. } => "unparsable_transfer",
            Diagnostic::UnknownTransferAccount { .. } => "unknown_transfer_account",
            Diagnostic::InvalidAmount { .. } => "invalid_amount",
            Diagnostic::InvalidDate { .. } => "invalid_date",
            Diagnostic::Overflow { .. } => "overflow",
        }
    }
}
