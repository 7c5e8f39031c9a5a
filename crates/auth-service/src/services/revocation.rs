//! Token revocation bookkeeping.
//!
//! A revoked token is recorded in an external key-value cache under its raw
//! token string with a TTL of `max(remaining_validity, 0) + grace_offset`.
//! The cache expires entries on its own; nothing here ever deletes one.
//!
//! Every cache round trip is bounded by a timeout. A failed or timed-out
//! lookup is reported as [`AuthError::RevocationStoreUnavailable`], never as
//! "not revoked"; whether to accept the token anyway is decided by the caller
//! through [`RevocationFailurePolicy`].

use crate::errors::AuthError;
use crate::observability::metrics::{record_revocation, record_revocation_check};
use async_trait::async_trait;
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// External TTL-capable key-value cache holding revocation markers.
///
/// Implementations must be safe for concurrent use and must not hold locks
/// across awaits.
#[async_trait]
pub trait RevocationCache: Send + Sync {
    /// `SET key value EX ttl_seconds`
    async fn set_with_ttl(&self, key: &str, value: &str, ttl_seconds: u64)
        -> Result<(), AuthError>;

    /// `EXISTS key`
    async fn exists(&self, key: &str) -> Result<bool, AuthError>;
}

/// What validation does when the revocation state of a token is unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RevocationFailurePolicy {
    /// Reject the token with `RevocationStoreUnavailable`.
    #[default]
    FailClosed,
    /// Accept a cryptographically valid token and log a warning.
    FailOpen,
}

impl fmt::Display for RevocationFailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RevocationFailurePolicy::FailClosed => write!(f, "fail_closed"),
            RevocationFailurePolicy::FailOpen => write!(f, "fail_open"),
        }
    }
}

impl FromStr for RevocationFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fail_closed" | "closed" => Ok(RevocationFailurePolicy::FailClosed),
            "fail_open" | "open" => Ok(RevocationFailurePolicy::FailOpen),
            other => Err(format!(
                "unknown revocation failure policy '{}' (expected fail_closed or fail_open)",
                other
            )),
        }
    }
}

/// TTL for a revocation marker: remaining validity (floored at zero) plus
/// the grace offset.
pub fn revocation_ttl_seconds(remaining_validity_seconds: i64, grace_offset_seconds: u64) -> u64 {
    u64::try_from(remaining_validity_seconds.max(0))
        .unwrap_or(0)
        .saturating_add(grace_offset_seconds)
}

/// `exp - now`, or zero when `exp` is absent or malformed.
pub fn remaining_validity_seconds(exp: Option<i64>, now: i64) -> i64 {
    exp.map(|exp| exp.saturating_sub(now)).unwrap_or(0)
}

#[derive(Clone)]
pub struct RevocationStore {
    cache: Arc<dyn RevocationCache>,
    grace_offset_seconds: u64,
    timeout: Duration,
}

impl fmt::Debug for RevocationStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RevocationStore")
            .field("grace_offset_seconds", &self.grace_offset_seconds)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl RevocationStore {
    pub fn new(cache: Arc<dyn RevocationCache>, grace_offset_seconds: u64, timeout: Duration) -> Self {
        Self {
            cache,
            grace_offset_seconds,
            timeout,
        }
    }

    /// Record `token` as revoked for its remaining validity plus the grace
    /// offset.
    ///
    /// # Errors
    ///
    /// `RevocationStoreUnavailable` if the write fails or times out. The
    /// token is then NOT revoked and the caller should retry or report.
    #[instrument(skip_all, fields(remaining_validity_seconds = remaining_validity_seconds))]
    pub async fn revoke(&self, token: &str, remaining_validity_seconds: i64) -> Result<(), AuthError> {
        let ttl = revocation_ttl_seconds(remaining_validity_seconds, self.grace_offset_seconds);

        let result = self
            .bounded("revoke", self.cache.set_with_ttl(token, token, ttl))
            .await;

        match &result {
            Ok(()) => {
                debug!(target: "auth.revocation", ttl_seconds = ttl, "Token revoked");
                record_revocation("success");
            }
            Err(e) => {
                warn!(target: "auth.revocation", error = %e, "Failed to record revocation");
                record_revocation("error");
            }
        }

        result
    }

    /// Whether `token` has a live revocation marker.
    ///
    /// # Errors
    ///
    /// `RevocationStoreUnavailable` if the lookup fails or times out; the
    /// revocation state is then unknown.
    #[instrument(skip_all)]
    pub async fn is_revoked(&self, token: &str) -> Result<bool, AuthError> {
        let result = self.bounded("is_revoked", self.cache.exists(token)).await;

        record_revocation_check(match &result {
            Ok(true) => "revoked",
            Ok(false) => "not_revoked",
            Err(_) => "unavailable",
        });

        result
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T, AuthError>>,
    ) -> Result<T, AuthError> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(AuthError::RevocationStoreUnavailable(reason))) => {
                Err(AuthError::RevocationStoreUnavailable(reason))
            }
            Ok(Err(e)) => Err(AuthError::RevocationStoreUnavailable(format!(
                "{} failed: {}",
                operation, e
            ))),
            Err(_) => {
                warn!(
                    target: "auth.revocation",
                    operation = operation,
                    timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                    "Revocation store call timed out"
                );
                Err(AuthError::RevocationStoreUnavailable(format!(
                    "{} timed out after {}ms",
                    operation,
                    self.timeout.as_millis()
                )))
            }
        }
    }
}
