use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque account identifier, stable for the lifetime of the account
pub type AccountId = String;

/// User account identity record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Unique ID, generated at signup and immutable afterwards
    pub id: AccountId,

    /// Normalized email address, unique across accounts
    pub email: String,

    /// Password verifier (Argon2 PHC string, salted, one-way)
    pub password_hash: String,

    /// Ban flag; a banned account is never granted access regardless of plan
    pub is_banned: bool,

    /// Account creation time
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Create a new account with a freshly generated id. The email is
    /// normalized before storage so lookups are case-insensitive.
    pub fn new(email: &str, password_hash: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            email: normalize_email(email),
            password_hash,
            is_banned: false,
            created_at: Utc::now(),
        }
    }
}

/// Normalize an email address for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_normalization() {
        assert_eq!(normalize_email("  User@Example.COM "), "user@example.com");
        assert_eq!(normalize_email("a@x.com"), "a@x.com");
    }

    #[test]
    fn test_new_account_defaults() {
        let account = Account::new("A@X.com", "phc-string".to_string());
        assert_eq!(account.email, "a@x.com");
        assert!(!account.is_banned);
        assert!(!account.id.is_empty());
    }

    #[test]
    fn test_account_ids_are_unique() {
        let a = Account::new("a@x.com", String::new());
        let b = Account::new("b@x.com", String::new());
        assert_ne!(a.id, b.id);
    }
}
