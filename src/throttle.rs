// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Rate limiting for budget threshold alerts.
//!
//! State lives only in memory and starts empty with each process. Per
//! category, an alert may fire when spend is at or above the threshold, the
//! cooldown since the previous alert has strictly elapsed, and fewer than
//! `max_alerts` have been sent. Once the cap is reached the category stays
//! silent for the rest of the process.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use tracing::debug;

use crate::budget::WARNING_PERCENT;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottlePolicy {
    pub threshold: Decimal,
    pub cooldown: Duration,
    pub max_alerts: u32,
}

impl Default for ThrottlePolicy {
    fn default() -> Self {
        Self {
            threshold: WARNING_PERCENT,
            cooldown: Duration::minutes(2),
            max_alerts: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryAlerts {
    pub last_sent_at: DateTime<Utc>,
    pub count: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationState {
    policy: ThrottlePolicy,
    categories: HashMap<String, CategoryAlerts>,
}

impl NotificationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: ThrottlePolicy) -> Self {
        Self {
            policy,
            categories: HashMap::new(),
        }
    }

    pub fn policy(&self) -> &ThrottlePolicy {
        &self.policy
    }

    pub fn get(&self, category: &str) -> Option<&CategoryAlerts> {
        self.categories.get(category)
    }

    pub fn should_notify(&self, category: &str, percentage: Decimal, now: DateTime<Utc>) -> bool {
        if percentage < self.policy.threshold {
            return false;
        }
        match self.categories.get(category) {
            None => self.policy.max_alerts > 0,
            Some(prev) => {
                prev.count < self.policy.max_alerts
                    && now.signed_duration_since(prev.last_sent_at) > self.policy.cooldown
            }
        }
    }

    /// Marks an alert as sent for `category` at `now`.
    pub fn record(&mut self, category: &str, now: DateTime<Utc>) {
        let entry = self
            .categories
            .entry(category.to_string())
            .or_insert(CategoryAlerts {
                last_sent_at: now,
                count: 0,
            });
        entry.last_sent_at = now;
        entry.count += 1;
        debug!(category, count = entry.count, "alert recorded");
    }
}

/// Shareable throttle whose check and record happen under one lock.
#[derive(Debug, Default)]
pub struct NotificationThrottle {
    state: Mutex<NotificationState>,
}

impl NotificationThrottle {
    pub fn new(policy: ThrottlePolicy) -> Self {
        Self {
            state: Mutex::new(NotificationState::with_policy(policy)),
        }
    }

    /// Returns true when an alert should go out, recording it in the same step.
    pub fn check_and_record(&self, category: &str, percentage: Decimal, now: DateTime<Utc>) -> bool {
        let mut state = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if state.should_notify(category, percentage, now) {
            state.record(category, now);
            true
        } else {
            false
        }
    }

    pub fn snapshot(&self) -> NotificationState {
        match self.state.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}
