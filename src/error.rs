use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the entitlement core
#[derive(Debug, Error, Clone, Serialize, Deserialize)]
pub enum CoreError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Email already registered: {0}")]
    EmailTaken(String),

    #[error("Account is banned")]
    AccountBanned,

    #[error("Session expired")]
    SessionExpired,

    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Feature disabled: {0}")]
    FeatureDisabled(String),

    #[error("Service is in maintenance mode")]
    MaintenanceMode,

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Invalid admin secret")]
    InvalidAdminSecret,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Create a new internal error
    pub fn internal<T: Into<String>>(msg: T) -> Self {
        Self::Internal(msg.into())
    }

    /// Create a new not found error
    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        Self::NotFound(msg.into())
    }

    /// Get error category for metrics and logging
    pub fn category(&self) -> &'static str {
        match self {
            CoreError::InvalidCredentials => "auth",
            CoreError::EmailTaken(_) => "auth",
            CoreError::AccountBanned => "auth",
            CoreError::SessionExpired => "auth",
            CoreError::QuotaExceeded(_) => "quota",
            CoreError::FeatureDisabled(_) => "config",
            CoreError::MaintenanceMode => "config",
            CoreError::StoreUnavailable(_) => "storage",
            CoreError::InvalidAdminSecret => "auth",
            CoreError::NotFound(_) => "not_found",
            CoreError::InvalidRequest(_) => "invalid_request",
            CoreError::Internal(_) => "internal",
        }
    }

    /// Check if error is retryable. Only transient infrastructure failures
    /// qualify; every credential, quota or config rejection is terminal for
    /// the attempted operation.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CoreError::StoreUnavailable(_))
    }

    /// Check if error is expected and presentable to the end user
    pub fn is_user_facing(&self) -> bool {
        !matches!(
            self,
            CoreError::StoreUnavailable(_) | CoreError::Internal(_)
        )
    }
}
