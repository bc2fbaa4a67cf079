#![allow(dead_code)]

use std::sync::Arc;

use quillgen_core::config::settings::{AdminConfig, Config};
use quillgen_core::server::AppState;

pub const ADMIN_EMAIL: &str = "owner@quillgen.dev";
pub const ADMIN_PASSWORD: &str = "owner-password";
pub const ADMIN_SECRET: &str = "test-admin-secret";

/// Application state over fresh in-memory storage with admin credentials
/// configured.
pub async fn test_state() -> Arc<AppState> {
    let mut config = Config::default();
    config.admin = AdminConfig {
        owner_email: ADMIN_EMAIL.to_string(),
        owner_password: ADMIN_PASSWORD.to_string(),
        owner_password_hash: None,
        admin_secret: ADMIN_SECRET.to_string(),
    };

    AppState::new(config).await.unwrap()
}

/// Application state with the default (unconfigured) admin credentials.
pub async fn test_state_no_admin() -> Arc<AppState> {
    AppState::new(Config::default()).await.unwrap()
}
