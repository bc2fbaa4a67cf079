//! Entitlement and session core for a content-generation service.
//!
//! Accounts, session tokens, plan entitlements, per-plan quota
//! enforcement, global kill-switches and an in-process change
//! notification fabric, all over a pluggable async storage trait.

pub mod config;
pub mod error;
pub mod models;
pub mod server;
pub mod services;
pub mod storage;

pub use config::settings::Config;
pub use error::{CoreError, Result};
pub use server::{AppState, ChangeTopic, Session};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
