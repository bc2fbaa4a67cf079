use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{CoreError, Result};
use crate::models::{OpClass, Profile, QuotaRemaining};
use crate::server::notification_manager::{ChangeTopic, NotificationManager};
use crate::storage::{Storage, StorageError};

/// Decides whether quota-gated operations are permitted and records
/// consumption against per-plan limits.
pub struct QuotaEnforcer {
    storage: Arc<dyn Storage>,
    notifier: Arc<NotificationManager>,
}

impl QuotaEnforcer {
    /// Create a new quota enforcer over the given storage backend
    pub fn new(storage: Arc<dyn Storage>, notifier: Arc<NotificationManager>) -> Self {
        Self { storage, notifier }
    }

    /// Detailed permission check against the authoritative store: bans and
    /// exact counts are read fresh, not from any session cache.
    pub async fn ensure_allowed(&self, account_id: &str, class: OpClass) -> Result<()> {
        let account = self
            .storage
            .get_account_by_id(account_id)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("account {}", account_id)))?;

        if account.is_banned {
            return Err(CoreError::AccountBanned);
        }

        let profile = self
            .storage
            .get_profile(account_id)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("profile {}", account_id)))?;

        match profile.plan.limit(class) {
            None => Ok(()),
            Some(limit) if profile.count(class) < limit => Ok(()),
            Some(limit) => Err(CoreError::QuotaExceeded(format!(
                "{} limit of {} reached",
                class.as_str(),
                limit
            ))),
        }
    }

    /// Pure decision: may this account perform one more operation of the
    /// given class? False for banned or missing accounts and for exhausted
    /// free-tier counters; no side effects.
    pub async fn can_use(&self, account_id: &str, class: OpClass) -> Result<bool> {
        match self.ensure_allowed(account_id, class).await {
            Ok(()) => Ok(true),
            Err(CoreError::AccountBanned)
            | Err(CoreError::QuotaExceeded(_))
            | Err(CoreError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Record one completed operation. Call only after the underlying
    /// operation actually succeeded; failed generations are never charged.
    ///
    /// The check-and-increment happens atomically inside the store, so
    /// concurrent commits from the same account (two browser tabs) cannot
    /// lose an increment or sneak past the limit. Fires `UsageChanged` and
    /// returns the updated profile; callers refresh their profile cache.
    pub async fn commit(
        &self,
        account_id: &str,
        class: OpClass,
        feature_tag: &str,
    ) -> Result<Profile> {
        let profile = self
            .storage
            .commit_usage(account_id, class, feature_tag)
            .await
            .map_err(|e| match e {
                StorageError::LimitReached(msg) => CoreError::QuotaExceeded(msg),
                StorageError::PermissionDenied(_) => CoreError::AccountBanned,
                other => other.into(),
            })?;

        info!(
            "Usage committed for {}: {} now {}",
            account_id,
            class.as_str(),
            profile.count(class)
        );
        self.notifier.publish(ChangeTopic::UsageChanged).await;
        Ok(profile)
    }

    /// Remaining quota for an operation class over a profile snapshot.
    /// Pure function; `Unbounded` for paid plans. Counters are lifetime
    /// totals with no reset window.
    pub fn remaining_quota(profile: &Profile, class: OpClass) -> QuotaRemaining {
        let remaining = profile.remaining(class);
        debug!(
            "Remaining {} quota for {}: {:?}",
            class.as_str(),
            profile.account_id,
            remaining
        );
        remaining
    }
}
