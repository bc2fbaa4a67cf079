use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex as TokioMutex;
use tracing::debug;

use crate::config::constants::is_recognized_feature;
use crate::models::{Account, AuditLogEntry, GlobalConfig, OpClass, Profile};
use crate::storage::{Result, Storage, StorageError};

// In-memory storage data structure (using Mutex for thread safety)
struct StorageData {
    accounts: HashMap<String, Account>, // account_id -> account
    emails: HashMap<String, String>,    // normalized email -> account_id
    profiles: HashMap<String, Profile>, // account_id -> profile
    audit_log: Vec<AuditLogEntry>,      // append-only
    global_config: GlobalConfig,
}

impl StorageData {
    fn new() -> Self {
        Self {
            accounts: HashMap::new(),
            emails: HashMap::new(),
            profiles: HashMap::new(),
            audit_log: Vec::new(),
            global_config: GlobalConfig::default(),
        }
    }
}

/// In-memory storage implementation. All tables live behind one mutex, so
/// `commit_usage` is a single-lock read-modify-write and concurrent commits
/// against the same account serialize without lost increments.
pub struct MemoryStorage {
    data: TokioMutex<StorageData>,
}

impl MemoryStorage {
    /// Create a new memory storage instance
    pub fn new() -> Self {
        Self {
            data: TokioMutex::new(StorageData::new()),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    async fn create_account(&self, account: &Account, profile: &Profile) -> Result<()> {
        let mut data = self.data.lock().await;

        if data.emails.contains_key(&account.email) {
            return Err(StorageError::AlreadyExists(account.email.clone()));
        }

        data.emails
            .insert(account.email.clone(), account.id.clone());
        data.accounts.insert(account.id.clone(), account.clone());
        data.profiles.insert(account.id.clone(), profile.clone());
        Ok(())
    }

    async fn get_account_by_id(&self, id: &str) -> Result<Option<Account>> {
        let data = self.data.lock().await;
        Ok(data.accounts.get(id).cloned())
    }

    async fn get_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        let data = self.data.lock().await;
        let account = data
            .emails
            .get(email)
            .and_then(|id| data.accounts.get(id))
            .cloned();
        Ok(account)
    }

    async fn update_account(&self, account: &Account) -> Result<()> {
        let mut data = self.data.lock().await;

        if !data.accounts.contains_key(&account.id) {
            return Err(StorageError::NotFound(format!(
                "Account not found: {}",
                account.id
            )));
        }

        data.accounts.insert(account.id.clone(), account.clone());
        Ok(())
    }

    async fn get_profile(&self, account_id: &str) -> Result<Option<Profile>> {
        let data = self.data.lock().await;
        Ok(data.profiles.get(account_id).cloned())
    }

    async fn update_profile(&self, profile: &Profile) -> Result<()> {
        let mut data = self.data.lock().await;

        if !data.profiles.contains_key(&profile.account_id) {
            return Err(StorageError::NotFound(format!(
                "Profile not found: {}",
                profile.account_id
            )));
        }

        data.profiles
            .insert(profile.account_id.clone(), profile.clone());
        Ok(())
    }

    async fn commit_usage(
        &self,
        account_id: &str,
        class: OpClass,
        feature_tag: &str,
    ) -> Result<Profile> {
        let mut data = self.data.lock().await;

        // Ban and limit are re-checked under the same lock as the increment
        // so a losing racer observes the final count, never a stale one.
        let banned = data
            .accounts
            .get(account_id)
            .ok_or_else(|| StorageError::NotFound(format!("Account not found: {}", account_id)))?
            .is_banned;

        if banned {
            return Err(StorageError::PermissionDenied(format!(
                "Account is banned: {}",
                account_id
            )));
        }

        let profile = data.profiles.get_mut(account_id).ok_or_else(|| {
            StorageError::NotFound(format!("Profile not found: {}", account_id))
        })?;

        if let Some(limit) = profile.plan.limit(class) {
            if profile.count(class) >= limit {
                return Err(StorageError::LimitReached(format!(
                    "{} limit of {} reached",
                    class.as_str(),
                    limit
                )));
            }
        }

        match class {
            OpClass::Text => profile.text_count += 1,
            OpClass::Media => profile.pro_count += 1,
        }

        if is_recognized_feature(feature_tag) {
            *profile.stats.entry(feature_tag.to_string()).or_insert(0) += 1;
        } else {
            debug!("Ignoring unrecognized feature tag: {}", feature_tag);
        }

        Ok(profile.clone())
    }

    async fn append_audit(&self, entry: &AuditLogEntry) -> Result<()> {
        let mut data = self.data.lock().await;
        data.audit_log.push(entry.clone());
        Ok(())
    }

    async fn list_audit_entries(&self, account_id: Option<&str>) -> Result<Vec<AuditLogEntry>> {
        let data = self.data.lock().await;

        let entries = data
            .audit_log
            .iter()
            .filter(|entry| account_id.map_or(true, |id| entry.account_id == id))
            .cloned()
            .collect();

        Ok(entries)
    }

    async fn get_global_config(&self) -> Result<GlobalConfig> {
        let data = self.data.lock().await;
        Ok(data.global_config.clone())
    }

    async fn put_global_config(&self, config: &GlobalConfig) -> Result<()> {
        let mut data = self.data.lock().await;
        data.global_config = config.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Plan;

    fn account(email: &str) -> (Account, Profile) {
        let account = Account::new(email, "phc".to_string());
        let profile = Profile::new_free(&account.id);
        (account, profile)
    }

    #[tokio::test]
    async fn test_email_uniqueness_enforced_at_creation() {
        let storage = MemoryStorage::new();
        let (a, p) = account("a@x.com");
        storage.create_account(&a, &p).await.unwrap();

        let (b, q) = account("a@x.com");
        let err = storage.create_account(&b, &q).await.unwrap_err();
        assert!(matches!(err, StorageError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_lookup_by_email_and_id() {
        let storage = MemoryStorage::new();
        let (a, p) = account("a@x.com");
        storage.create_account(&a, &p).await.unwrap();

        let by_email = storage.get_account_by_email("a@x.com").await.unwrap();
        assert_eq!(by_email.unwrap().id, a.id);

        let by_id = storage.get_account_by_id(&a.id).await.unwrap();
        assert_eq!(by_id.unwrap().email, "a@x.com");

        assert!(storage
            .get_account_by_email("missing@x.com")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_commit_usage_increments_and_tracks_features() {
        let storage = MemoryStorage::new();
        let (a, p) = account("a@x.com");
        storage.create_account(&a, &p).await.unwrap();

        let profile = storage
            .commit_usage(&a.id, OpClass::Text, "article")
            .await
            .unwrap();
        assert_eq!(profile.text_count, 1);
        assert_eq!(profile.pro_count, 0);
        assert_eq!(profile.stats.get("article"), Some(&1));
    }

    #[tokio::test]
    async fn test_commit_usage_ignores_unrecognized_tags() {
        let storage = MemoryStorage::new();
        let (a, p) = account("a@x.com");
        storage.create_account(&a, &p).await.unwrap();

        let profile = storage
            .commit_usage(&a.id, OpClass::Text, "future-feature")
            .await
            .unwrap();
        assert_eq!(profile.text_count, 1);
        assert!(profile.stats.is_empty());
    }

    #[tokio::test]
    async fn test_commit_usage_enforces_free_limit() {
        let storage = MemoryStorage::new();
        let (a, p) = account("a@x.com");
        storage.create_account(&a, &p).await.unwrap();

        for _ in 0..3 {
            storage
                .commit_usage(&a.id, OpClass::Media, "image")
                .await
                .unwrap();
        }

        let err = storage
            .commit_usage(&a.id, OpClass::Media, "image")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::LimitReached(_)));

        // Failed commit left the profile unchanged
        let profile = storage.get_profile(&a.id).await.unwrap().unwrap();
        assert_eq!(profile.pro_count, 3);
    }

    #[tokio::test]
    async fn test_commit_usage_unlimited_for_paid_plans() {
        let storage = MemoryStorage::new();
        let (a, mut p) = account("a@x.com");
        p.plan = Plan::Pro;
        storage.create_account(&a, &p).await.unwrap();

        for _ in 0..20 {
            storage
                .commit_usage(&a.id, OpClass::Text, "article")
                .await
                .unwrap();
        }

        let profile = storage.get_profile(&a.id).await.unwrap().unwrap();
        assert_eq!(profile.text_count, 20);
    }

    #[tokio::test]
    async fn test_commit_usage_rejects_banned_account() {
        let storage = MemoryStorage::new();
        let (mut a, p) = account("a@x.com");
        a.is_banned = true;
        storage.create_account(&a, &p).await.unwrap();

        let err = storage
            .commit_usage(&a.id, OpClass::Text, "article")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::PermissionDenied(_)));
    }

    #[tokio::test]
    async fn test_audit_log_filtering() {
        use crate::models::{AuditAction, AuditSeverity};

        let storage = MemoryStorage::new();
        let entry_a = AuditLogEntry::new(
            AuditAction::PlanGranted,
            AuditSeverity::Info,
            "pro".to_string(),
            "acct-a",
            None,
        );
        let entry_b = AuditLogEntry::new(
            AuditAction::Banned,
            AuditSeverity::Warning,
            "banned".to_string(),
            "acct-b",
            None,
        );
        storage.append_audit(&entry_a).await.unwrap();
        storage.append_audit(&entry_b).await.unwrap();

        assert_eq!(storage.list_audit_entries(None).await.unwrap().len(), 2);
        let filtered = storage.list_audit_entries(Some("acct-b")).await.unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].action, AuditAction::Banned);
    }
}
