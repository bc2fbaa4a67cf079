use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{CoreError, Result};
use crate::models::{Capability, GlobalConfig, GlobalConfigPatch};
use crate::server::notification_manager::{ChangeTopic, NotificationManager};
use crate::storage::Storage;

/// Global feature kill-switches and maintenance flag, independent of any
/// single user. Reads happen on every capability dispatch; writes come
/// only from the admin path.
pub struct ConfigService {
    storage: Arc<dyn Storage>,
    notifier: Arc<NotificationManager>,
}

impl ConfigService {
    /// Create a new config service over the given storage backend
    pub fn new(storage: Arc<dyn Storage>, notifier: Arc<NotificationManager>) -> Self {
        Self { storage, notifier }
    }

    /// Current global config
    pub async fn get(&self) -> Result<GlobalConfig> {
        Ok(self.storage.get_global_config().await?)
    }

    /// Merge a partial update over the current config, persist it and fire
    /// `ConfigChanged`. Omitted fields are left untouched.
    pub async fn set(&self, patch: GlobalConfigPatch) -> Result<GlobalConfig> {
        let mut config = self.storage.get_global_config().await?;
        config.apply(&patch);
        self.storage.put_global_config(&config).await?;

        info!(
            "Global config updated: maintenance={}, text={}, media={}, voice={}",
            config.maintenance_mode,
            config.features.text_generation,
            config.features.media_generation,
            config.features.voice_synthesis
        );
        self.notifier.publish(ChangeTopic::ConfigChanged).await;
        Ok(config)
    }

    /// Gate a capability dispatch: refuses everything but read-only views
    /// during maintenance, and refuses capabilities whose kill-switch is
    /// off.
    pub async fn check_dispatch(&self, capability: Capability) -> Result<()> {
        let config = self.storage.get_global_config().await?;

        if config.maintenance_mode {
            debug!("Dispatch refused, maintenance mode");
            return Err(CoreError::MaintenanceMode);
        }

        if !config.feature_enabled(capability) {
            debug!("Dispatch refused, {} disabled", capability.as_str());
            return Err(CoreError::FeatureDisabled(capability.as_str().to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStorage;

    fn service() -> ConfigService {
        ConfigService::new(
            Arc::new(MemoryStorage::new()),
            Arc::new(NotificationManager::new()),
        )
    }

    #[tokio::test]
    async fn test_partial_update_persists() {
        let service = service();

        service
            .set(GlobalConfigPatch {
                voice_synthesis: Some(false),
                ..Default::default()
            })
            .await
            .unwrap();

        let config = service.get().await.unwrap();
        assert!(!config.feature_enabled(Capability::VoiceSynthesis));
        assert!(config.feature_enabled(Capability::TextGeneration));
    }

    #[tokio::test]
    async fn test_disabled_capability_refuses_dispatch() {
        let service = service();
        service
            .set(GlobalConfigPatch {
                voice_synthesis: Some(false),
                ..Default::default()
            })
            .await
            .unwrap();

        let err = service
            .check_dispatch(Capability::VoiceSynthesis)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::FeatureDisabled(_)));

        service
            .check_dispatch(Capability::TextGeneration)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_maintenance_mode_refuses_everything() {
        let service = service();
        service
            .set(GlobalConfigPatch {
                maintenance_mode: Some(true),
                ..Default::default()
            })
            .await
            .unwrap();

        for capability in [
            Capability::TextGeneration,
            Capability::MediaGeneration,
            Capability::VoiceSynthesis,
        ] {
            let err = service.check_dispatch(capability).await.unwrap_err();
            assert!(matches!(err, CoreError::MaintenanceMode));
        }
    }

    #[tokio::test]
    async fn test_set_fires_config_changed() {
        let service = service();
        let (_key, mut rx) = service.notifier.subscribe(ChangeTopic::ConfigChanged).await;

        service.set(GlobalConfigPatch::default()).await.unwrap();
        assert_eq!(rx.recv().await, Some(ChangeTopic::ConfigChanged));
    }
}
