use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use crate::error::Result;
use crate::models::Profile;
use crate::services::auth_service::SessionManager;
use crate::storage::Storage;

/// Session-scoped snapshot of the authenticated user's profile.
///
/// Read-through caching is explicit: `current()` never does I/O, and
/// callers refresh after login, after usage commits and after entitlement
/// mutations so stale quota state is not served. Correctness-critical
/// decisions re-validate against the store instead of trusting this cache.
pub struct ProfileCache {
    storage: Arc<dyn Storage>,
    session: Arc<SessionManager>,
    snapshot: Mutex<Option<Profile>>,
}

impl ProfileCache {
    /// Create a cache bound to one session
    pub fn new(storage: Arc<dyn Storage>, session: Arc<SessionManager>) -> Self {
        Self {
            storage,
            session,
            snapshot: Mutex::new(None),
        }
    }

    /// Re-fetch the authenticated user's profile and replace the snapshot
    /// wholesale. Clears the cache and returns None when no account is
    /// authenticated (or its profile is gone).
    pub async fn refresh(&self) -> Result<Option<Profile>> {
        let account_id = match self.session.current_account_id().await {
            Some(id) => id,
            None => {
                let mut snapshot = self.snapshot.lock().await;
                *snapshot = None;
                return Ok(None);
            }
        };

        let profile = self.storage.get_profile(&account_id).await?;
        debug!(
            "Profile cache refreshed for {}: {}",
            account_id,
            if profile.is_some() { "hit" } else { "empty" }
        );

        let mut snapshot = self.snapshot.lock().await;
        *snapshot = profile.clone();
        Ok(profile)
    }

    /// Last-refreshed snapshot; never triggers I/O
    pub async fn current(&self) -> Option<Profile> {
        self.snapshot.lock().await.clone()
    }
}
