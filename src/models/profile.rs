use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::constants::{FREE_MEDIA_LIMIT, FREE_TEXT_LIMIT};
use crate::models::account::AccountId;

/// Subscription tier governing quota limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Free,
    Pro,
    Agency,
}

impl Plan {
    /// Paid plans are unlimited for both operation classes
    pub fn is_paid(&self) -> bool {
        !matches!(self, Plan::Free)
    }

    /// Lifetime usage ceiling for an operation class, None when unlimited
    pub fn limit(&self, class: OpClass) -> Option<u32> {
        match self {
            Plan::Free => Some(match class {
                OpClass::Text => FREE_TEXT_LIMIT,
                OpClass::Media => FREE_MEDIA_LIMIT,
            }),
            Plan::Pro | Plan::Agency => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Free => "free",
            Plan::Pro => "pro",
            Plan::Agency => "agency",
        }
    }
}

/// Subscription lifecycle state as reported by the payment collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Canceled,
    PastDue,
    None,
}

/// Class of a quota-gated operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpClass {
    Text,
    Media,
}

impl OpClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpClass::Text => "text",
            OpClass::Media => "media",
        }
    }
}

/// Remaining quota for an operation class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuotaRemaining {
    Limited(u32),
    Unbounded,
}

/// Entitlement and usage view over an account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Owning account id
    pub account_id: AccountId,

    /// Current subscription tier
    pub plan: Plan,

    /// Subscription lifecycle state
    pub subscription_status: SubscriptionStatus,

    /// Opaque subscription id set by the payment collaborator
    pub subscription_id: Option<String>,

    /// Lifetime count of text-class operations
    pub text_count: u32,

    /// Lifetime count of media-class operations
    pub pro_count: u32,

    /// Per-feature usage breakdown (feature tag -> count)
    pub stats: HashMap<String, u64>,
}

impl Profile {
    /// Zeroed profile for a freshly signed-up account
    pub fn new_free(account_id: &str) -> Self {
        Self {
            account_id: account_id.to_string(),
            plan: Plan::Free,
            subscription_status: SubscriptionStatus::None,
            subscription_id: None,
            text_count: 0,
            pro_count: 0,
            stats: HashMap::new(),
        }
    }

    /// Current counter for an operation class
    pub fn count(&self, class: OpClass) -> u32 {
        match class {
            OpClass::Text => self.text_count,
            OpClass::Media => self.pro_count,
        }
    }

    /// Remaining lifetime quota for an operation class on this snapshot.
    /// Pure over the snapshot; callers needing exact counts re-validate
    /// against the store.
    pub fn remaining(&self, class: OpClass) -> QuotaRemaining {
        match self.plan.limit(class) {
            None => QuotaRemaining::Unbounded,
            Some(limit) => QuotaRemaining::Limited(limit.saturating_sub(self.count(class))),
        }
    }
}
