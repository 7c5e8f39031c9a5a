//! Credential lookup capability.
//!
//! The service ships no user database and no built-in accounts. Whoever
//! constructs the backend supplies a [`CredentialStore`] backed by their own
//! user records.

use crate::errors::AuthError;
use async_trait::async_trait;
use std::fmt;

/// A user's stored login record.
#[derive(Clone)]
pub struct StoredCredential {
    /// Stable identifier written into the `sub` claim.
    pub subject: String,
    /// bcrypt hash of the user's password.
    pub password_hash: String,
}

impl fmt::Debug for StoredCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredCredential")
            .field("subject", &self.subject)
            .field("password_hash", &"[REDACTED]")
            .finish()
    }
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look up the stored record for `username`.
    ///
    /// Returns `Ok(None)` for an unknown user. Infrastructure failures should
    /// be reported as `AuthError::CredentialStoreUnavailable`.
    async fn find_by_username(&self, username: &str)
        -> Result<Option<StoredCredential>, AuthError>;
}
