//! Authentication backend.
//!
//! Composes the issuer, validator and revocation store behind the operations
//! request handlers need: authenticate, login, issue, validate and logout.
//! The backend is constructed once and shared by reference or `Arc`; it holds
//! no mutable state of its own.

use crate::config::Config;
use crate::crypto::keys::KeyStore;
use crate::crypto::{verify_password, Claims, DUMMY_PASSWORD_HASH};
use crate::errors::AuthError;
use crate::models::{Credentials, TokenResponse, BEARER_TOKEN_TYPE};
use crate::observability::hash_for_correlation;
use crate::observability::metrics::{
    record_authentication, record_token_issuance, record_token_validation,
};
use crate::repositories::credentials::CredentialStore;
use crate::services::revocation::{
    remaining_validity_seconds, RevocationCache, RevocationFailurePolicy, RevocationStore,
};
use crate::services::token_issuer::TokenIssuer;
use crate::services::token_validator::TokenValidator;
use chrono::Utc;
use secrecy::ExposeSecret;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument, warn};

/// Tunables for [`AuthenticationBackend`], usually derived from [`Config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendSettings {
    pub token_lifetime_seconds: i64,
    pub admin_claim: bool,
    pub clock_skew: Duration,
    pub revocation_grace_seconds: u64,
    pub revocation_timeout: Duration,
    pub revocation_failure_policy: RevocationFailurePolicy,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            token_lifetime_seconds: crate::config::DEFAULT_TOKEN_LIFETIME_SECONDS,
            admin_claim: false,
            clock_skew: crate::config::DEFAULT_JWT_CLOCK_SKEW,
            revocation_grace_seconds: crate::config::DEFAULT_REVOCATION_GRACE_SECONDS,
            revocation_timeout: Duration::from_millis(crate::config::DEFAULT_REVOCATION_TIMEOUT_MS),
            revocation_failure_policy: RevocationFailurePolicy::default(),
        }
    }
}

impl From<&Config> for BackendSettings {
    fn from(config: &Config) -> Self {
        Self {
            token_lifetime_seconds: config.token_lifetime_seconds,
            admin_claim: config.admin_claim,
            clock_skew: config.jwt_clock_skew,
            revocation_grace_seconds: config.revocation_grace_seconds,
            revocation_timeout: config.revocation_timeout,
            revocation_failure_policy: config.revocation_failure_policy,
        }
    }
}

pub struct AuthenticationBackend {
    issuer: TokenIssuer,
    validator: TokenValidator,
    revocation: RevocationStore,
    credentials: Arc<dyn CredentialStore>,
    failure_policy: RevocationFailurePolicy,
}

impl fmt::Debug for AuthenticationBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticationBackend")
            .field("issuer", &self.issuer)
            .field("validator", &self.validator)
            .field("revocation", &self.revocation)
            .field("failure_policy", &self.failure_policy)
            .finish_non_exhaustive()
    }
}

impl AuthenticationBackend {
    /// Load the signing keys named in `config` and build the backend.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::KeyLoadFailure` if either key cannot be loaded.
    /// The caller decides whether to abort startup.
    #[instrument(skip_all)]
    pub fn initialize(
        config: &Config,
        revocation_cache: Arc<dyn RevocationCache>,
        credential_store: Arc<dyn CredentialStore>,
    ) -> Result<Self, AuthError> {
        let keys = KeyStore::load(&config.private_key_path, &config.public_key_path).map_err(
            |e| {
                error!(target: "auth.backend", error = %e, "Failed to load signing keys");
                e
            },
        )?;

        let backend = Self::new(
            keys,
            BackendSettings::from(config),
            revocation_cache,
            credential_store,
        );

        info!(
            target: "auth.backend",
            token_lifetime_seconds = config.token_lifetime_seconds,
            revocation_failure_policy = %config.revocation_failure_policy,
            "Authentication backend initialized"
        );

        Ok(backend)
    }

    pub fn new(
        keys: KeyStore,
        settings: BackendSettings,
        revocation_cache: Arc<dyn RevocationCache>,
        credential_store: Arc<dyn CredentialStore>,
    ) -> Self {
        let keys = Arc::new(keys);

        Self {
            issuer: TokenIssuer::new(
                keys.clone(),
                settings.token_lifetime_seconds,
                settings.admin_claim,
            ),
            validator: TokenValidator::new(keys, settings.clock_skew),
            revocation: RevocationStore::new(
                revocation_cache,
                settings.revocation_grace_seconds,
                settings.revocation_timeout,
            ),
            credentials: credential_store,
            failure_policy: settings.revocation_failure_policy,
        }
    }

    /// Check a username/password pair against the credential store.
    ///
    /// Unknown users still pay for a bcrypt comparison against
    /// [`DUMMY_PASSWORD_HASH`] so response time does not reveal whether the
    /// username exists.
    ///
    /// # Errors
    ///
    /// `CredentialStoreUnavailable` if the lookup fails.
    #[instrument(skip_all)]
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<bool, AuthError> {
        Ok(self.verify_credentials(credentials).await?.is_some())
    }

    /// Authenticate and, on success, issue a token for the stored subject.
    ///
    /// # Errors
    ///
    /// `InvalidCredentials` for an unknown user or wrong password.
    #[instrument(skip_all)]
    pub async fn login(&self, credentials: &Credentials) -> Result<TokenResponse, AuthError> {
        let subject = self
            .verify_credentials(credentials)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let access_token = self.issue_token(&subject)?;

        Ok(TokenResponse {
            access_token,
            token_type: BEARER_TOKEN_TYPE.to_string(),
            expires_in: u64::try_from(self.issuer.lifetime_seconds()).unwrap_or(0),
        })
    }

    /// Issue a signed token for `subject`.
    #[instrument(skip_all)]
    pub fn issue_token(&self, subject: &str) -> Result<String, AuthError> {
        let start = Instant::now();
        let result = self.issuer.generate_token(subject);

        let status = if result.is_ok() { "success" } else { "error" };
        record_token_issuance(status, start.elapsed());

        if let Err(e) = &result {
            error!(target: "auth.backend", error = %e, "Token issuance failed");
        }

        result
    }

    /// Validate `token` and confirm it has not been revoked.
    ///
    /// # Errors
    ///
    /// Any validator rejection, `TokenRevoked`, or
    /// `RevocationStoreUnavailable` when the store cannot be reached and the
    /// failure policy is fail-closed.
    #[instrument(skip_all)]
    pub async fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        let result = self.validate_inner(token).await;

        match &result {
            Ok(_) => record_token_validation("success", None),
            Err(e) => record_token_validation("error", Some(e.category())),
        }

        result
    }

    async fn validate_inner(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = self.validator.validate(token)?;

        match self.revocation.is_revoked(token).await {
            Ok(false) => Ok(claims),
            Ok(true) => {
                debug!(target: "auth.backend", trace = %claims.trace, "Token rejected: revoked");
                Err(AuthError::TokenRevoked)
            }
            Err(e) => match self.failure_policy {
                RevocationFailurePolicy::FailClosed => {
                    warn!(
                        target: "auth.backend",
                        error = %e,
                        "Revocation state unknown, rejecting token"
                    );
                    Err(e)
                }
                RevocationFailurePolicy::FailOpen => {
                    warn!(
                        target: "auth.backend",
                        error = %e,
                        trace = %claims.trace,
                        "Revocation state unknown, accepting token under fail-open policy"
                    );
                    Ok(claims)
                }
            },
        }
    }

    /// Revoke a token whose claims the caller has already validated.
    ///
    /// # Errors
    ///
    /// `RevocationStoreUnavailable` if the marker could not be written; the
    /// token then remains usable until it expires.
    #[instrument(skip_all)]
    pub async fn logout(&self, token: &str, claims: &Claims) -> Result<(), AuthError> {
        let remaining = claims.remaining_validity_seconds(Utc::now().timestamp());
        self.revocation.revoke(token, remaining).await?;

        info!(
            target: "auth.backend",
            subject = %hash_for_correlation(&claims.sub),
            trace = %claims.trace,
            "Token revoked on logout"
        );

        Ok(())
    }

    /// Revoke a raw token without validated claims.
    ///
    /// `exp` is read without verification and only sizes the TTL; if it is
    /// absent or malformed the marker lives for the grace offset alone.
    #[instrument(skip_all)]
    pub async fn logout_token(&self, token: &str) -> Result<(), AuthError> {
        let remaining = remaining_validity_seconds(
            TokenValidator::peek_expiry(token),
            Utc::now().timestamp(),
        );
        self.revocation.revoke(token, remaining).await?;

        info!(target: "auth.backend", "Token revoked on logout");

        Ok(())
    }

    /// Returns the stored subject when the credentials match.
    async fn verify_credentials(
        &self,
        credentials: &Credentials,
    ) -> Result<Option<String>, AuthError> {
        let record = self
            .credentials
            .find_by_username(&credentials.username)
            .await
            .map_err(|e| {
                record_authentication("error");
                error!(target: "auth.backend", error = %e, "Credential lookup failed");
                match e {
                    AuthError::CredentialStoreUnavailable(reason) => {
                        AuthError::CredentialStoreUnavailable(reason)
                    }
                    other => AuthError::CredentialStoreUnavailable(other.to_string()),
                }
            })?;

        // Always run bcrypt, even for unknown users.
        let hash = record
            .as_ref()
            .map(|r| r.password_hash.clone())
            .unwrap_or_else(|| DUMMY_PASSWORD_HASH.to_string());
        let password = credentials.password.clone();

        let verified = tokio::task::spawn_blocking(move || {
            verify_password(password.expose_secret(), &hash)
        })
        .await
        .map_err(|e| {
            record_authentication("error");
            error!(target: "auth.backend", error = %e, "Password verification task failed");
            AuthError::Internal
        })?;

        let matched = match verified {
            Ok(matched) => matched,
            Err(e) => {
                // A corrupt stored hash is treated as a failed login.
                warn!(target: "auth.backend", error = %e, "Stored password hash is unusable");
                false
            }
        };

        let username_hash = hash_for_correlation(&credentials.username);
        match record {
            Some(record) if matched => {
                record_authentication("success");
                debug!(target: "auth.backend", username = %username_hash, "Authentication succeeded");
                Ok(Some(record.subject))
            }
            _ => {
                record_authentication("invalid_credentials");
                debug!(target: "auth.backend", username = %username_hash, "Authentication failed");
                Ok(None)
            }
        }
    }
}
