use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::account::AccountId;

/// Proof of authentication for a normal user. Validity is checked lazily at
/// point of use; there is no background expiry sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionToken {
    /// Account this token authenticates
    pub account_id: AccountId,

    /// Opaque token value
    pub token: String,

    /// When the token was issued
    pub issued_at: DateTime<Utc>,

    /// When the token expires
    pub expires_at: DateTime<Utc>,
}

impl SessionToken {
    /// Issue a new token for an account with the given validity window
    pub fn issue(account_id: &str, ttl_hours: i64) -> Self {
        let now = Utc::now();
        Self {
            account_id: account_id.to_string(),
            token: uuid::Uuid::new_v4().to_string(),
            issued_at: now,
            expires_at: now + Duration::hours(ttl_hours),
        }
    }

    /// Lazy expiry check
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// Higher-privilege admin console session, guarded by a three-factor login.
/// Lives in a distinct namespace from user session tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminSession {
    /// Opaque token value
    pub token: String,

    /// When the session was issued
    pub issued_at: DateTime<Utc>,

    /// When the session expires
    pub expires_at: DateTime<Utc>,
}

impl AdminSession {
    /// Issue a new admin session with the given validity window
    pub fn issue(token: String, ttl_minutes: i64) -> Self {
        let now = Utc::now();
        Self {
            token,
            issued_at: now,
            expires_at: now + Duration::minutes(ttl_minutes),
        }
    }

    /// Lazy expiry check
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}
