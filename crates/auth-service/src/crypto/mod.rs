//! Token claims, algorithm pinning and password verification.
//!
//! Key loading lives in [`keys`].

pub mod keys;

use crate::errors::AuthError;
use jsonwebtoken::Algorithm;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::instrument;

/// The single signing algorithm this service issues and accepts.
pub const TOKEN_ALGORITHM: Algorithm = Algorithm::RS512;

/// Header `alg` value for [`TOKEN_ALGORITHM`].
pub const TOKEN_ALGORITHM_NAME: &str = "RS512";

/// Maximum allowed JWT size in bytes (8KB).
///
/// Checked before any base64 decoding or signature verification so an
/// oversized token costs nothing but a length comparison.
pub const MAX_JWT_SIZE_BYTES: usize = 8192;

/// Verified against when a username is unknown, so lookups for missing and
/// existing users take the same time.
pub const DUMMY_PASSWORD_HASH: &str =
    "$2b$12$LQv3c1yqBWVHxkd0LHAkCOYz6TtxMQJqhN8/LewY5GyYqExt7YD3a";

/// Token claims.
///
/// `admin` is carried as a string (`"true"`/`"false"`) on the wire. `trace`
/// is a per-token correlation id. Debug output redacts `sub`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user identifier)
    pub sub: String,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiration (unix seconds)
    pub exp: i64,
    #[serde(default)]
    pub admin: String,
    #[serde(default)]
    pub trace: String,
}

impl fmt::Debug for Claims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Claims")
            .field("sub", &"[REDACTED]")
            .field("iat", &self.iat)
            .field("exp", &self.exp)
            .field("admin", &self.admin)
            .field("trace", &self.trace)
            .finish()
    }
}

impl Claims {
    /// Build claims for `sub` issued at `now` and valid for `lifetime_seconds`.
    pub fn new(
        sub: impl Into<String>,
        now: i64,
        lifetime_seconds: i64,
        admin: bool,
        trace: impl Into<String>,
    ) -> Self {
        Self {
            sub: sub.into(),
            iat: now,
            exp: now.saturating_add(lifetime_seconds),
            admin: admin.to_string(),
            trace: trace.into(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.admin == "true"
    }

    /// Seconds until `exp`, negative once expired.
    pub fn remaining_validity_seconds(&self, now: i64) -> i64 {
        self.exp.saturating_sub(now)
    }
}

/// Verify a password against a stored bcrypt hash
#[instrument(skip_all)]
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    bcrypt::verify(password, hash)
        .map_err(|e| AuthError::Crypto(format!("Password verification failed: {}", e)))
}
