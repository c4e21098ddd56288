// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::ledger::Aggregation;
use crate::models::{Budget, BudgetRecord};

pub const WARNING_PERCENT: Decimal = Decimal::from_parts(75, 0, 0, false, 0);
pub const CRITICAL_PERCENT: Decimal = Decimal::from_parts(90, 0, 0, false, 0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetLevel {
    OnTrack,
    Warning,
    Critical,
}

impl BudgetLevel {
    pub fn color(&self) -> &'static str {
        match self {
            BudgetLevel::OnTrack => "#4CAF50",
            BudgetLevel::Warning => "#FF9800",
            BudgetLevel::Critical => "#F44336",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            BudgetLevel::OnTrack => "On track",
            BudgetLevel::Warning => "Approaching budget limit",
            BudgetLevel::Critical => "Budget nearly exhausted",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetStatus {
    pub level: BudgetLevel,
    pub percentage: Decimal,
    pub color: &'static str,
    pub message: &'static str,
}

/// Share of `limit` consumed by `spent`, in percent. A non-positive limit is 0%.
///
/// Ratios too large for `Decimal` saturate at `Decimal::MAX` (or `MIN` for
/// negative spend).
pub fn percentage(spent: Decimal, limit: Decimal) -> Decimal {
    if limit <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    spent
        .checked_div(limit)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(if spent.is_sign_negative() {
            Decimal::MIN
        } else {
            Decimal::MAX
        })
}

pub fn level_for(percentage: Decimal) -> BudgetLevel {
    if percentage >= CRITICAL_PERCENT {
        BudgetLevel::Critical
    } else if percentage >= WARNING_PERCENT {
        BudgetLevel::Warning
    } else {
        BudgetLevel::OnTrack
    }
}

pub fn status(spent: Decimal, limit: Decimal) -> BudgetStatus {
    let percentage = percentage(spent, limit);
    let level = level_for(percentage);
    BudgetStatus {
        level,
        percentage,
        color: level.color(),
        message: level.message(),
    }
}

/// Attaches spend from `aggregation` to each record and classifies it.
pub fn derive_budgets(records: &[BudgetRecord], aggregation: &Aggregation) -> Vec<Budget> {
    records
        .iter()
        .map(|r| {
            let current_spend = aggregation.spent_in(&r.category);
            Budget {
                id: r.id,
                category: r.category.clone(),
                limit_amount: r.limit_amount,
                current_spend,
                status: status(current_spend, r.limit_amount),
            }
        })
        .collect()
}
