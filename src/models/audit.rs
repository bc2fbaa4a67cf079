use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::account::AccountId;

/// Severity of an audit log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditSeverity {
    Info,
    Warning,
    Critical,
}

/// Entitlement-affecting action recorded in the audit log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditAction {
    PlanGranted,
    PlanRevoked,
    Banned,
    Unbanned,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::PlanGranted => "plan.granted",
            AuditAction::PlanRevoked => "plan.revoked",
            AuditAction::Banned => "account.banned",
            AuditAction::Unbanned => "account.unbanned",
        }
    }
}

/// Append-only record of an entitlement-affecting action. Write-only from
/// the core's perspective; the admin console reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogEntry {
    /// Entry unique identifier
    pub id: String,

    /// What happened
    pub action: AuditAction,

    /// Severity level
    pub severity: AuditSeverity,

    /// Human-readable description
    pub message: String,

    /// Account the action applied to
    pub account_id: AccountId,

    /// Account that initiated the action, when known
    pub actor: Option<AccountId>,

    /// When the action happened
    pub timestamp: DateTime<Utc>,
}

impl AuditLogEntry {
    /// Create a new entry timestamped now
    pub fn new(
        action: AuditAction,
        severity: AuditSeverity,
        message: String,
        account_id: &str,
        actor: Option<AccountId>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            action,
            severity,
            message,
            account_id: account_id.to_string(),
            actor,
            timestamp: Utc::now(),
        }
    }
}
