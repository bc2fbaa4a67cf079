use std::sync::Arc;

use tracing::info;

use crate::config::settings::Config;
use crate::error::{CoreError, Result};
use crate::models::{Capability, OpClass, Profile, SessionToken};
use crate::server::notification_manager::NotificationManager;
use crate::services::{
    ConfigService, EntitlementUpdater, ProfileCache, QuotaEnforcer, SessionManager,
};
use crate::storage::{init_storage, Storage, StorageFactory};

/// Application state shared across all sessions: the storage backend, the
/// notification fabric and the account-global services. Per-user state
/// lives in `Session`, never here.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration
    pub config: Config,
    /// Storage backend for accounts, profiles, audit and global config
    pub storage: Arc<dyn Storage>,
    /// Notification manager for broadcasting state changes
    pub notifier: Arc<NotificationManager>,
    /// Quota decisions and usage commits
    pub quota: Arc<QuotaEnforcer>,
    /// Single entry point for entitlement mutations
    pub entitlements: Arc<EntitlementUpdater>,
    /// Global kill-switches and maintenance flag
    pub global_config: Arc<ConfigService>,
}

impl AppState {
    /// Create application state with an in-memory storage backend
    pub async fn new(config: Config) -> Result<Arc<Self>> {
        let storage = Arc::new(StorageFactory::create_memory_storage());
        Self::new_with_storage(config, storage).await
    }

    /// Create application state with the given storage backend
    pub async fn new_with_storage(
        config: Config,
        storage: Arc<dyn Storage>,
    ) -> Result<Arc<Self>> {
        let storage = init_storage(storage).await?;
        let notifier = Arc::new(NotificationManager::new());

        let quota = Arc::new(QuotaEnforcer::new(storage.clone(), notifier.clone()));
        let entitlements = Arc::new(EntitlementUpdater::new(storage.clone(), notifier.clone()));
        let global_config = Arc::new(ConfigService::new(storage.clone(), notifier.clone()));

        info!("Application state initialized");
        Ok(Arc::new(Self {
            config,
            storage,
            notifier,
            quota,
            entitlements,
            global_config,
        }))
    }

    /// Open a new per-connection session. Each session carries its own
    /// session manager and profile cache so concurrent users never share
    /// cached state.
    pub fn open_session(self: &Arc<Self>) -> Session {
        let auth = Arc::new(SessionManager::new(
            self.storage.clone(),
            self.notifier.clone(),
            self.config.session.clone(),
            self.config.admin.clone(),
        ));
        let cache = Arc::new(ProfileCache::new(self.storage.clone(), auth.clone()));

        Session {
            state: self.clone(),
            auth,
            cache,
        }
    }
}

/// Per-connection session: one authenticated user at a time, with an
/// explicitly refreshed profile cache bound to that user's token.
pub struct Session {
    state: Arc<AppState>,
    /// Session manager for this connection
    pub auth: Arc<SessionManager>,
    /// Profile cache scoped to this connection
    pub cache: Arc<ProfileCache>,
}

impl Session {
    /// Sign up and prime the profile cache
    pub async fn signup(&self, email: &str, password: &str) -> Result<SessionToken> {
        let token = self.auth.signup(email, password).await?;
        self.cache.refresh().await?;
        Ok(token)
    }

    /// Log in and prime the profile cache
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionToken> {
        let token = self.auth.login(email, password).await?;
        self.cache.refresh().await?;
        Ok(token)
    }

    /// Log out and clear the profile cache
    pub async fn logout(&self) -> Result<()> {
        self.auth.logout().await;
        self.cache.refresh().await?;
        Ok(())
    }

    /// Gate one quota-gated operation before dispatching it: maintenance
    /// and kill-switch checks first, then identity, then ban and quota
    /// against the authoritative store.
    pub async fn authorize(&self, capability: Capability, class: OpClass) -> Result<()> {
        self.state.global_config.check_dispatch(capability).await?;

        let account_id = self
            .auth
            .current_account_id()
            .await
            .ok_or(CoreError::SessionExpired)?;

        self.state.quota.ensure_allowed(&account_id, class).await
    }

    /// Record a successfully completed operation and refresh the cache.
    /// Call only after the generation actually succeeded.
    pub async fn complete(&self, class: OpClass, feature_tag: &str) -> Result<Profile> {
        let account_id = self
            .auth
            .current_account_id()
            .await
            .ok_or(CoreError::SessionExpired)?;

        let profile = self.state.quota.commit(&account_id, class, feature_tag).await?;
        self.cache.refresh().await?;
        Ok(profile)
    }
}
