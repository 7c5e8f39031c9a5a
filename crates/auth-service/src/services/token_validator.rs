//! Token validation.
//!
//! Validation is a pure function of (token, public key, current time). The
//! checks run in a fixed order:
//!
//! 1. Size limit (before any decoding)
//! 2. Three `.`-separated segments
//! 3. Header `alg` pinned to RS512; any other value is rejected without
//!    touching the signature
//! 4. Payload decodes into [`Claims`]
//! 5. `exp` has not passed
//! 6. RS512 signature over `header.payload`
//! 7. `iat` is not beyond the clock skew tolerance
//!
//! Every rejection carries the same client-facing message; the precise reason
//! is logged at debug level under the `auth.crypto` target.

use crate::crypto::keys::KeyStore;
use crate::crypto::{Claims, MAX_JWT_SIZE_BYTES, TOKEN_ALGORITHM, TOKEN_ALGORITHM_NAME};
use crate::errors::AuthError;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

#[derive(Debug, Clone)]
pub struct TokenValidator {
    keys: Arc<KeyStore>,
    clock_skew: Duration,
}

/// The three segments of a compact token.
struct TokenParts<'a> {
    header: &'a str,
    payload: &'a str,
    signature: &'a str,
    /// `header.payload`, the bytes the signature covers.
    signing_input: &'a str,
}

impl TokenValidator {
    pub fn new(keys: Arc<KeyStore>, clock_skew: Duration) -> Self {
        Self { keys, clock_skew }
    }

    /// Validate `token` against the current wall clock.
    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        self.validate_at(token, Utc::now().timestamp())
    }

    /// Validate `token` as if the current time were `now` (unix seconds).
    #[instrument(skip_all)]
    pub fn validate_at(&self, token: &str, now: i64) -> Result<Claims, AuthError> {
        if token.len() > MAX_JWT_SIZE_BYTES {
            debug!(
                target: "auth.crypto",
                token_size = token.len(),
                max_size = MAX_JWT_SIZE_BYTES,
                "Token rejected: size exceeds maximum allowed"
            );
            return Err(AuthError::MalformedToken);
        }

        let parts = split_token(token).ok_or_else(|| {
            debug!(target: "auth.crypto", "Token rejected: not three segments");
            AuthError::MalformedToken
        })?;

        check_algorithm(parts.header)?;

        let claims: Claims = decode_json_segment(parts.payload).ok_or_else(|| {
            debug!(target: "auth.crypto", "Token rejected: payload is not a claim set");
            AuthError::MalformedToken
        })?;

        if now >= claims.exp {
            debug!(
                target: "auth.crypto",
                exp = claims.exp,
                now = now,
                "Token rejected: expired"
            );
            return Err(AuthError::TokenExpired);
        }

        let signature_valid = jsonwebtoken::crypto::verify(
            parts.signature,
            parts.signing_input.as_bytes(),
            self.keys.decoding_key(),
            TOKEN_ALGORITHM,
        )
        .unwrap_or_else(|e| {
            debug!(target: "auth.crypto", error = %e, "Signature could not be decoded");
            false
        });

        if !signature_valid {
            debug!(target: "auth.crypto", "Token rejected: signature mismatch");
            return Err(AuthError::InvalidSignature);
        }

        let clock_skew_seconds = i64::try_from(self.clock_skew.as_secs()).unwrap_or(i64::MAX);
        let max_iat = now.saturating_add(clock_skew_seconds);
        if claims.iat > max_iat {
            debug!(
                target: "auth.crypto",
                iat = claims.iat,
                now = now,
                max_allowed = max_iat,
                clock_skew_seconds = clock_skew_seconds,
                "Token rejected: iat too far in the future"
            );
            return Err(AuthError::TokenNotYetValid);
        }

        Ok(claims)
    }

    /// Read `exp` from a token without verifying it.
    ///
    /// Returns `None` when the token or its `exp` claim is absent or
    /// malformed. The result must only be used to size a revocation TTL,
    /// never to make an authentication decision.
    pub fn peek_expiry(token: &str) -> Option<i64> {
        if token.len() > MAX_JWT_SIZE_BYTES {
            return None;
        }
        let parts = split_token(token)?;
        let payload: serde_json::Value = decode_json_segment(parts.payload)?;
        payload.get("exp")?.as_i64()
    }
}

fn split_token(token: &str) -> Option<TokenParts<'_>> {
    let (signing_input, signature) = token.rsplit_once('.')?;
    let (header, payload) = signing_input.split_once('.')?;

    if payload.contains('.') || header.is_empty() || payload.is_empty() {
        return None;
    }

    Some(TokenParts {
        header,
        payload,
        signature,
        signing_input,
    })
}

fn check_algorithm(header_segment: &str) -> Result<(), AuthError> {
    let header: serde_json::Value = decode_json_segment(header_segment).ok_or_else(|| {
        debug!(target: "auth.crypto", "Token rejected: header is not valid JSON");
        AuthError::MalformedToken
    })?;

    match header.get("alg").and_then(|alg| alg.as_str()) {
        Some(TOKEN_ALGORITHM_NAME) => Ok(()),
        declared => {
            debug!(
                target: "auth.crypto",
                declared_alg = ?declared,
                "Token rejected: algorithm mismatch"
            );
            Err(AuthError::AlgorithmMismatch)
        }
    }
}

fn decode_json_segment<T: serde::de::DeserializeOwned>(segment: &str) -> Option<T> {
    let bytes = URL_SAFE_NO_PAD.decode(segment).ok()?;
    serde_json::from_slice(&bytes).ok()
}
