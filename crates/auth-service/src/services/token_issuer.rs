use crate::crypto::keys::KeyStore;
use crate::crypto::{Claims, TOKEN_ALGORITHM};
use crate::errors::AuthError;
use crate::observability::hash_for_correlation;
use chrono::Utc;
use jsonwebtoken::{encode, Header};
use std::sync::Arc;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Builds and signs tokens for a subject.
///
/// Stateless apart from the shared read-only keys; safe to call from any
/// number of tasks at once.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    keys: Arc<KeyStore>,
    lifetime_seconds: i64,
    admin: bool,
}

impl TokenIssuer {
    pub fn new(keys: Arc<KeyStore>, lifetime_seconds: i64, admin: bool) -> Self {
        Self {
            keys,
            lifetime_seconds,
            admin,
        }
    }

    pub fn lifetime_seconds(&self) -> i64 {
        self.lifetime_seconds
    }

    /// Issue a token for `subject` valid from now.
    pub fn generate_token(&self, subject: &str) -> Result<String, AuthError> {
        self.generate_token_at(subject, Utc::now().timestamp())
    }

    /// Issue a token for `subject` as if the current time were `now`.
    #[instrument(skip_all)]
    pub fn generate_token_at(&self, subject: &str, now: i64) -> Result<String, AuthError> {
        let claims = Claims::new(
            subject,
            now,
            self.lifetime_seconds,
            self.admin,
            Uuid::new_v4().to_string(),
        );

        let token = self.sign(&claims)?;

        debug!(
            target: "auth.crypto",
            subject = %hash_for_correlation(subject),
            trace = %claims.trace,
            exp = claims.exp,
            "Token issued"
        );

        Ok(token)
    }

    /// Sign an arbitrary claim set with the service key.
    #[instrument(skip_all)]
    pub fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        let mut header = Header::new(TOKEN_ALGORITHM);
        header.typ = Some("JWT".to_string());

        encode(&header, claims, self.keys.encoding_key())
            .map_err(|e| AuthError::SigningFailure(format!("JWT signing operation failed: {}", e)))
    }
}
