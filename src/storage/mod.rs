pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, instrument};

use crate::error::CoreError;
use crate::models::{Account, AuditLogEntry, GlobalConfig, OpClass, Profile};

/// Storage Result type
pub type Result<T> = std::result::Result<T, StorageError>;

/// Error types for storage operations
#[derive(Debug, Error, Clone)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Limit reached: {0}")]
    LimitReached(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl StorageError {
    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StorageError::Connection(_) | StorageError::Database(_)
        )
    }

    /// Get error category for metrics
    pub fn category(&self) -> &'static str {
        match self {
            StorageError::Database(_) => "database",
            StorageError::Connection(_) => "connection",
            StorageError::NotFound(_) => "not_found",
            StorageError::AlreadyExists(_) => "conflict",
            StorageError::LimitReached(_) => "limit",
            StorageError::PermissionDenied(_) => "permission",
            StorageError::ValidationError(_) => "validation",
            StorageError::Internal(_) => "internal",
        }
    }
}

impl From<StorageError> for CoreError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(msg) => CoreError::NotFound(msg),
            StorageError::AlreadyExists(msg) => CoreError::EmailTaken(msg),
            StorageError::LimitReached(msg) => CoreError::QuotaExceeded(msg),
            StorageError::PermissionDenied(_) => CoreError::AccountBanned,
            StorageError::ValidationError(msg) => CoreError::InvalidRequest(msg),
            StorageError::Database(msg) | StorageError::Connection(msg) => {
                CoreError::StoreUnavailable(msg)
            }
            StorageError::Internal(msg) => CoreError::Internal(msg),
        }
    }
}

/// Credential, usage, audit and config store contract.
///
/// `commit_usage` is the only operation the backend must make atomic per
/// account; every other mutation is an infrequent, single-actor
/// last-writer-wins update.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Health check with connection validation
    async fn health_check(&self) -> Result<bool>;

    // Account related methods. Creation enforces email uniqueness and
    // stores the zeroed profile alongside the identity record.
    async fn create_account(&self, account: &Account, profile: &Profile) -> Result<()>;
    async fn get_account_by_id(&self, id: &str) -> Result<Option<Account>>;
    async fn get_account_by_email(&self, email: &str) -> Result<Option<Account>>;
    async fn update_account(&self, account: &Account) -> Result<()>;

    // Profile related methods
    async fn get_profile(&self, account_id: &str) -> Result<Option<Profile>>;
    async fn update_profile(&self, profile: &Profile) -> Result<()>;

    /// Atomically record one completed operation against an account.
    ///
    /// The backend must perform ban check, limit check and increment as a
    /// single read-modify-write per account: two racing commits may not
    /// lose an increment, and a commit that finds the limit already reached
    /// fails with `LimitReached` leaving the profile unchanged. A
    /// recognized feature tag additionally bumps the per-feature breakdown;
    /// unrecognized tags are ignored. Returns the updated profile.
    async fn commit_usage(
        &self,
        account_id: &str,
        class: OpClass,
        feature_tag: &str,
    ) -> Result<Profile>;

    // Audit log: append-only from the core's perspective
    async fn append_audit(&self, entry: &AuditLogEntry) -> Result<()>;
    async fn list_audit_entries(&self, account_id: Option<&str>) -> Result<Vec<AuditLogEntry>>;

    // Global config
    async fn get_global_config(&self) -> Result<GlobalConfig>;
    async fn put_global_config(&self, config: &GlobalConfig) -> Result<()>;
}

/// Storage factory
pub struct StorageFactory;

impl StorageFactory {
    /// Create in-memory storage
    pub fn create_memory_storage() -> memory::MemoryStorage {
        info!("Creating memory storage");
        memory::MemoryStorage::new()
    }
}

/// Initialize a storage backend, validating its health before use
#[instrument(skip(storage))]
pub async fn init_storage(storage: Arc<dyn Storage>) -> crate::error::Result<Arc<dyn Storage>> {
    storage
        .health_check()
        .await
        .map_err(|e| CoreError::StoreUnavailable(format!("storage health check failed: {}", e)))?;

    info!("Storage layer initialized");
    Ok(storage)
}
