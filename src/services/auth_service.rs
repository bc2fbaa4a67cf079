use std::sync::Arc;

use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use chrono::Utc;
use password_hash::{PasswordHash, SaltString};
use rand::rngs::OsRng;
use rand::RngCore;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::settings::{AdminConfig, SessionConfig};
use crate::error::{CoreError, Result};
use crate::models::account::{normalize_email, Account, AccountId};
use crate::models::{AdminSession, Profile, SessionToken};
use crate::server::notification_manager::{ChangeTopic, NotificationManager};
use crate::storage::Storage;

/// Session manager for one client connection. Tracks at most one active
/// user session token and one admin session; multi-device support is a
/// matter of creating more instances.
pub struct SessionManager {
    storage: Arc<dyn Storage>,
    notifier: Arc<NotificationManager>,
    session_config: SessionConfig,
    admin_config: AdminConfig,
    current: Mutex<Option<SessionToken>>,
    current_admin: Mutex<Option<AdminSession>>,
}

impl SessionManager {
    /// Create a new session manager over the given storage backend
    pub fn new(
        storage: Arc<dyn Storage>,
        notifier: Arc<NotificationManager>,
        session_config: SessionConfig,
        admin_config: AdminConfig,
    ) -> Self {
        Self {
            storage,
            notifier,
            session_config,
            admin_config,
            current: Mutex::new(None),
            current_admin: Mutex::new(None),
        }
    }

    /// Register a new account and authenticate it.
    ///
    /// Fails with `EmailTaken` when the normalized email is already
    /// registered. On success the account gets a zeroed free-plan profile
    /// and a fresh session token, and `AuthChanged` fires.
    pub async fn signup(&self, email: &str, password: &str) -> Result<SessionToken> {
        let email = normalize_email(email);

        if self.storage.get_account_by_email(&email).await?.is_some() {
            return Err(CoreError::EmailTaken(email));
        }

        let password_hash = hash_password(password)?;
        let account = Account::new(&email, password_hash);
        let profile = Profile::new_free(&account.id);

        self.storage.create_account(&account, &profile).await?;
        info!("Account created: {}", account.id);

        let token = self.install_session(&account.id).await;
        self.notifier.publish(ChangeTopic::AuthChanged).await;
        Ok(token)
    }

    /// Authenticate an existing account.
    ///
    /// A missing account and a verifier mismatch both yield
    /// `InvalidCredentials`; a storage failure yields `StoreUnavailable`
    /// and is never folded into the credential error. A banned account is
    /// rejected with `AccountBanned` even with correct credentials.
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionToken> {
        let email = normalize_email(email);

        let account = match self.storage.get_account_by_email(&email).await? {
            Some(account) => account,
            None => {
                debug!("Login failed, unknown email");
                return Err(CoreError::InvalidCredentials);
            }
        };

        if !verify_password(&account.password_hash, password) {
            debug!("Login failed, verifier mismatch for {}", account.id);
            return Err(CoreError::InvalidCredentials);
        }

        if account.is_banned {
            warn!("Login refused for banned account {}", account.id);
            return Err(CoreError::AccountBanned);
        }

        let token = self.install_session(&account.id).await;
        info!("Account logged in: {}", account.id);
        self.notifier.publish(ChangeTopic::AuthChanged).await;
        Ok(token)
    }

    /// Destroy the current session token. Idempotent: with no active
    /// session this is a no-op and nothing fires.
    pub async fn logout(&self) {
        let had_session = {
            let mut current = self.current.lock().await;
            current.take().is_some()
        };

        if had_session {
            info!("Session destroyed");
            self.notifier.publish(ChangeTopic::AuthChanged).await;
        }
    }

    /// Identity of the caller, or None when unauthenticated.
    ///
    /// The 24-hour TTL is checked lazily here, on every call that needs
    /// the caller's identity; a token past its window is destroyed
    /// (implicit logout) before None is returned.
    pub async fn current_account_id(&self) -> Option<AccountId> {
        let expired = {
            let mut current = self.current.lock().await;
            match current.as_ref() {
                None => return None,
                Some(token) if token.is_expired() => {
                    *current = None;
                    true
                }
                Some(token) => return Some(token.account_id.clone()),
            }
        };

        if expired {
            debug!("Session token expired, implicit logout");
            self.notifier.publish(ChangeTopic::AuthChanged).await;
        }
        None
    }

    /// Resume a previously issued session token (e.g. a reconnecting
    /// client). Validity is still checked lazily on the next identity read.
    pub async fn resume(&self, token: SessionToken) {
        let mut current = self.current.lock().await;
        *current = Some(token);
    }

    /// Admin console login, guarded by three factors: owner email, owner
    /// password and the server-held secret, all configuration-supplied.
    pub async fn admin_login(
        &self,
        email: &str,
        password: &str,
        secret: &str,
    ) -> Result<AdminSession> {
        // An unconfigured secret disables the admin path outright
        if self.admin_config.admin_secret.is_empty() {
            warn!("Admin login attempted with no admin secret configured");
            return Err(CoreError::InvalidAdminSecret);
        }

        if normalize_email(email) != normalize_email(&self.admin_config.owner_email) {
            return Err(CoreError::InvalidCredentials);
        }

        let password_ok = match &self.admin_config.owner_password_hash {
            Some(phc) => verify_password(phc, password),
            None => {
                warn!("Comparing admin password without a configured hash");
                !self.admin_config.owner_password.is_empty()
                    && self.admin_config.owner_password == password
            }
        };
        if !password_ok {
            return Err(CoreError::InvalidCredentials);
        }

        if secret != self.admin_config.admin_secret {
            warn!("Admin login refused, secret mismatch");
            return Err(CoreError::InvalidAdminSecret);
        }

        let session = AdminSession::issue(
            generate_admin_token(),
            self.session_config.admin_ttl_minutes,
        );

        let mut current_admin = self.current_admin.lock().await;
        *current_admin = Some(session.clone());
        info!("Admin session issued, expires at {}", session.expires_at);
        Ok(session)
    }

    /// Whether a live admin session is held, with lazy expiry
    pub async fn admin_session_active(&self) -> bool {
        let mut current_admin = self.current_admin.lock().await;
        match current_admin.as_ref() {
            Some(session) if !session.is_expired() => true,
            Some(_) => {
                *current_admin = None;
                false
            }
            None => false,
        }
    }

    async fn install_session(&self, account_id: &str) -> SessionToken {
        let token = SessionToken::issue(account_id, self.session_config.token_ttl_hours);
        let mut current = self.current.lock().await;
        *current = Some(token.clone());
        token
    }
}

/// Hash a password into an Argon2id PHC string with a random salt
pub fn hash_password(password: &str) -> Result<String> {
    let mut salt_bytes = [0u8; 16];
    OsRng.fill_bytes(&mut salt_bytes);
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| CoreError::Internal(format!("salt encoding failed: {}", e)))?;

    let argon2 = Argon2::default();
    let phc = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| CoreError::Internal(format!("password hashing failed: {}", e)))?
        .to_string();
    Ok(phc)
}

/// Verify a password against a stored PHC string
pub fn verify_password(hash: &str, password: &str) -> bool {
    if let Ok(parsed) = PasswordHash::new(hash) {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    } else {
        false
    }
}

/// Generate a high-entropy opaque admin token
fn generate_admin_token() -> String {
    let mut buffer = [0u8; 32];
    OsRng.fill_bytes(&mut buffer);
    format!("adm_{}_{}", Utc::now().timestamp(), hex::encode(buffer))
}
