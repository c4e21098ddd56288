// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// Multiplicative conversion factors keyed `"FROM_TO"`.
///
/// `1 FROM = rate TO`. Codes are stored upper-cased; same-currency pairs are
/// implicitly 1 and never need an entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    rates: BTreeMap<String, Decimal>,
}

pub fn pair_key(from: &str, to: &str) -> String {
    format!("{}_{}", from.trim().to_uppercase(), to.trim().to_uppercase())
}

/// Upper-cases and checks a three-letter ISO 4217 style code.
pub fn normalize_code(code: &str) -> Result<String, LedgerError> {
    let c = code.trim().to_uppercase();
    if c.len() == 3 && c.chars().all(|ch| ch.is_ascii_alphabetic()) {
        Ok(c)
    } else {
        Err(LedgerError::InvalidCurrency(code.to_string()))
    }
}

impl RateTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, from: &str, to: &str, rate: Decimal) {
        self.rates.insert(pair_key(from, to), rate);
    }

    /// Builder-style insert, handy for literals.
    pub fn with(mut self, from: &str, to: &str, rate: Decimal) -> Self {
        self.insert(from, to, rate);
        self
    }

    pub fn remove(&mut self, from: &str, to: &str) -> Option<Decimal> {
        self.rates.remove(&pair_key(from, to))
    }

    pub fn get(&self, from: &str, to: &str) -> Option<Decimal> {
        self.rates.get(&pair_key(from, to)).copied()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.rates.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl FromIterator<(String, Decimal)> for RateTable {
    fn from_iter<I: IntoIterator<Item = (String, Decimal)>>(iter: I) -> Self {
        let rates = iter
            .into_iter()
            .map(|(k, v)| (k.trim().to_uppercase(), v))
            .collect();
        Self { rates }
    }
}

/// Converts `amount` and fails when the pair is not in the table.
///
/// Same-currency conversion returns `amount` untouched.
pub fn convert_checked(
    amount: Decimal,
    from: &str,
    to: &str,
    rates: &RateTable,
) -> Result<Decimal, LedgerError> {
    if from.trim().eq_ignore_ascii_case(to.trim()) {
        return Ok(amount);
    }
    let from = from.trim().to_uppercase();
    let to = to.trim().to_uppercase();
    let Some(rate) = rates.get(&from, &to) else {
        return Err(LedgerError::MissingRate { from, to });
    };
    amount.checked_mul(rate).ok_or_else(|| LedgerError::Overflow {
        amount: amount.to_string(),
        from,
        to,
    })
}

/// Converts `amount`, treating a missing pair as rate 1.0.
///
/// A product too large for `Decimal` saturates at `Decimal::MAX` / `Decimal::MIN`.
pub fn convert(amount: Decimal, from: &str, to: &str, rates: &RateTable) -> Decimal {
    match convert_checked(amount, from, to, rates) {
        Ok(v) => v,
        Err(LedgerError::Overflow { .. }) => saturate(amount, rates.get(from, to)),
        Err(_) => amount,
    }
}

fn saturate(amount: Decimal, rate: Option<Decimal>) -> Decimal {
    let negative = amount.is_sign_negative() != rate.is_some_and(|r| r.is_sign_negative());
    if negative { Decimal::MIN } else { Decimal::MAX }
}
