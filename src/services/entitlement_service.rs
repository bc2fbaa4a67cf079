use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{CoreError, Result};
use crate::models::account::AccountId;
use crate::models::{
    AuditAction, AuditLogEntry, AuditSeverity, Plan, SubscriptionStatus,
};
use crate::server::notification_manager::{ChangeTopic, NotificationManager};
use crate::storage::Storage;

/// Subscription lifecycle event from the payment collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionEvent {
    pub account_id: AccountId,
    pub event: SubscriptionEventKind,
    #[serde(default)]
    pub plan: Option<Plan>,
    #[serde(default)]
    pub subscription_id: Option<String>,
}

/// Webhook event discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubscriptionEventKind {
    #[serde(rename = "subscription.created")]
    Created,
    #[serde(rename = "subscription.cancelled")]
    Cancelled,
}

/// Single entry point for all plan mutations: payment webhooks, admin
/// overrides and ban toggles all funnel through here. Every real mutation
/// appends an audit entry and fires `ProfileChanged` + `UsageChanged`.
pub struct EntitlementUpdater {
    storage: Arc<dyn Storage>,
    notifier: Arc<NotificationManager>,
}

impl EntitlementUpdater {
    /// Create a new entitlement updater over the given storage backend
    pub fn new(storage: Arc<dyn Storage>, notifier: Arc<NotificationManager>) -> Self {
        Self { storage, notifier }
    }

    /// Move an account to a new plan. Idempotent: re-applying the same
    /// target state changes nothing and appends no additional audit entry.
    pub async fn apply_plan_change(
        &self,
        account_id: &str,
        new_plan: Plan,
        subscription_id: Option<String>,
    ) -> Result<()> {
        let mut profile = self
            .storage
            .get_profile(account_id)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("profile {}", account_id)))?;

        let same_subscription = subscription_id.is_none()
            || subscription_id == profile.subscription_id;
        if profile.plan == new_plan && same_subscription {
            debug!(
                "Plan change to {} is a no-op for {}",
                new_plan.as_str(),
                account_id
            );
            return Ok(());
        }

        let old_plan = profile.plan;
        profile.plan = new_plan;
        profile.subscription_status = if new_plan.is_paid() {
            SubscriptionStatus::Active
        } else {
            SubscriptionStatus::None
        };
        if subscription_id.is_some() {
            profile.subscription_id = subscription_id;
        }

        self.storage.update_profile(&profile).await?;

        let action = if new_plan.is_paid() {
            AuditAction::PlanGranted
        } else {
            AuditAction::PlanRevoked
        };
        self.record(
            account_id,
            action,
            AuditSeverity::Info,
            format!("plan changed from {} to {}", old_plan.as_str(), new_plan.as_str()),
        )
        .await?;

        info!(
            "Plan changed for {}: {} -> {}",
            account_id,
            old_plan.as_str(),
            new_plan.as_str()
        );
        self.notify_profile_changed().await;
        Ok(())
    }

    /// Downgrade an account to the free plan and detach its subscription.
    /// Historical usage counters are kept. Idempotent for an account that
    /// is already free with no subscription.
    pub async fn apply_cancellation(&self, account_id: &str) -> Result<()> {
        let mut profile = self
            .storage
            .get_profile(account_id)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("profile {}", account_id)))?;

        if profile.plan == Plan::Free && profile.subscription_id.is_none() {
            debug!("Cancellation is a no-op for {}", account_id);
            return Ok(());
        }

        let old_plan = profile.plan;
        profile.plan = Plan::Free;
        profile.subscription_status = SubscriptionStatus::Canceled;
        profile.subscription_id = None;

        self.storage.update_profile(&profile).await?;
        self.record(
            account_id,
            AuditAction::PlanRevoked,
            AuditSeverity::Info,
            format!("subscription cancelled, {} -> free", old_plan.as_str()),
        )
        .await?;

        info!("Subscription cancelled for {}", account_id);
        self.notify_profile_changed().await;
        Ok(())
    }

    /// Toggle the ban flag. Takes effect on the next permission or login
    /// check; an already-issued session token is not forcibly terminated.
    pub async fn set_banned(&self, account_id: &str, banned: bool) -> Result<()> {
        let mut account = self
            .storage
            .get_account_by_id(account_id)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("account {}", account_id)))?;

        if account.is_banned == banned {
            debug!("Ban flag already {} for {}", banned, account_id);
            return Ok(());
        }

        account.is_banned = banned;
        self.storage.update_account(&account).await?;

        let (action, severity, message) = if banned {
            (
                AuditAction::Banned,
                AuditSeverity::Warning,
                "account banned".to_string(),
            )
        } else {
            (
                AuditAction::Unbanned,
                AuditSeverity::Info,
                "account unbanned".to_string(),
            )
        };
        self.record(account_id, action, severity, message).await?;

        warn!("Ban flag set to {} for {}", banned, account_id);
        self.notify_profile_changed().await;
        Ok(())
    }

    /// Route a payment-collaborator webhook event through the single
    /// mutation path.
    pub async fn handle_webhook(&self, event: SubscriptionEvent) -> Result<()> {
        debug!("Webhook event {:?} for {}", event.event, event.account_id);
        match event.event {
            SubscriptionEventKind::Created => {
                let plan = event.plan.ok_or_else(|| {
                    CoreError::InvalidRequest(
                        "subscription.created event without a plan".to_string(),
                    )
                })?;
                self.apply_plan_change(&event.account_id, plan, event.subscription_id)
                    .await
            }
            SubscriptionEventKind::Cancelled => self.apply_cancellation(&event.account_id).await,
        }
    }

    async fn record(
        &self,
        account_id: &str,
        action: AuditAction,
        severity: AuditSeverity,
        message: String,
    ) -> Result<()> {
        let entry = AuditLogEntry::new(action, severity, message, account_id, None);
        self.storage.append_audit(&entry).await?;
        Ok(())
    }

    async fn notify_profile_changed(&self) {
        self.notifier.publish(ChangeTopic::ProfileChanged).await;
        self.notifier.publish(ChangeTopic::UsageChanged).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Account, Profile};
    use crate::storage::memory::MemoryStorage;

    async fn setup() -> (EntitlementUpdater, Arc<MemoryStorage>, String) {
        let storage = Arc::new(MemoryStorage::new());
        let notifier = Arc::new(NotificationManager::new());

        let account = Account::new("a@x.com", "phc".to_string());
        let profile = Profile::new_free(&account.id);
        storage.create_account(&account, &profile).await.unwrap();

        let id = account.id.clone();
        (
            EntitlementUpdater::new(storage.clone(), notifier),
            storage,
            id,
        )
    }

    #[tokio::test]
    async fn test_plan_change_is_idempotent() {
        let (updater, storage, id) = setup().await;

        updater
            .apply_plan_change(&id, Plan::Pro, Some("sub-1".to_string()))
            .await
            .unwrap();
        updater
            .apply_plan_change(&id, Plan::Pro, Some("sub-1".to_string()))
            .await
            .unwrap();

        let entries = storage.list_audit_entries(Some(&id)).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, AuditAction::PlanGranted);

        let profile = storage.get_profile(&id).await.unwrap().unwrap();
        assert_eq!(profile.plan, Plan::Pro);
        assert_eq!(profile.subscription_status, SubscriptionStatus::Active);
        assert_eq!(profile.subscription_id.as_deref(), Some("sub-1"));
    }

    #[tokio::test]
    async fn test_cancellation_keeps_usage_counters() {
        let (updater, storage, id) = setup().await;

        updater
            .apply_plan_change(&id, Plan::Agency, Some("sub-9".to_string()))
            .await
            .unwrap();

        let mut profile = storage.get_profile(&id).await.unwrap().unwrap();
        profile.text_count = 42;
        storage.update_profile(&profile).await.unwrap();

        updater.apply_cancellation(&id).await.unwrap();

        let profile = storage.get_profile(&id).await.unwrap().unwrap();
        assert_eq!(profile.plan, Plan::Free);
        assert_eq!(profile.subscription_status, SubscriptionStatus::Canceled);
        assert!(profile.subscription_id.is_none());
        assert_eq!(profile.text_count, 42);
    }

    #[tokio::test]
    async fn test_ban_toggle_audits_once_per_transition() {
        let (updater, storage, id) = setup().await;

        updater.set_banned(&id, true).await.unwrap();
        updater.set_banned(&id, true).await.unwrap();
        updater.set_banned(&id, false).await.unwrap();

        let entries = storage.list_audit_entries(Some(&id)).await.unwrap();
        let actions: Vec<_> = entries.iter().map(|e| e.action).collect();
        assert_eq!(actions, vec![AuditAction::Banned, AuditAction::Unbanned]);

        let account = storage.get_account_by_id(&id).await.unwrap().unwrap();
        assert!(!account.is_banned);
    }

    #[tokio::test]
    async fn test_webhook_created_requires_plan() {
        let (updater, _storage, id) = setup().await;

        let err = updater
            .handle_webhook(SubscriptionEvent {
                account_id: id,
                event: SubscriptionEventKind::Created,
                plan: None,
                subscription_id: Some("sub-1".to_string()),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_webhook_wire_format() {
        let event: SubscriptionEvent = serde_json::from_str(
            r#"{
                "account_id": "acct-1",
                "event": "subscription.created",
                "plan": "pro",
                "subscription_id": "sub-77"
            }"#,
        )
        .unwrap();

        assert_eq!(event.event, SubscriptionEventKind::Created);
        assert_eq!(event.plan, Some(Plan::Pro));
        assert_eq!(event.subscription_id.as_deref(), Some("sub-77"));

        let cancelled: SubscriptionEvent = serde_json::from_str(
            r#"{"account_id": "acct-1", "event": "subscription.cancelled"}"#,
        )
        .unwrap();
        assert_eq!(cancelled.event, SubscriptionEventKind::Cancelled);
        assert!(cancelled.plan.is_none());
    }
}
