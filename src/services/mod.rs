pub mod auth_service;
pub mod config_service;
pub mod entitlement_service;
pub mod profile_cache;
pub mod quota_service;

pub use auth_service::SessionManager;
pub use config_service::ConfigService;
pub use entitlement_service::{EntitlementUpdater, SubscriptionEvent, SubscriptionEventKind};
pub use profile_cache::ProfileCache;
pub use quota_service::QuotaEnforcer;
