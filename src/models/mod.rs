pub mod account;
pub mod audit;
pub mod flags;
pub mod profile;
pub mod session;

pub use account::{Account, AccountId};
pub use audit::{AuditAction, AuditLogEntry, AuditSeverity};
pub use flags::{Capability, GlobalConfig, GlobalConfigPatch};
pub use profile::{OpClass, Plan, Profile, QuotaRemaining, SubscriptionStatus};
pub use session::{AdminSession, SessionToken};
