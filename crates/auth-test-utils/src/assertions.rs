//! Custom test assertions for expressive tests
//!
//! Inspects token contents without verifying the signature; pair these with
//! the real validator when the signature matters.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct JwtHeader {
    alg: String,
    #[serde(default)]
    typ: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JwtClaims {
    sub: String,
    iat: i64,
    exp: i64,
    #[serde(default)]
    admin: String,
    #[serde(default)]
    trace: String,
}

/// Custom assertions for issued tokens
///
/// # Example
/// ```rust,ignore
/// token
///     .assert_valid_jwt()
///     .assert_for_subject("user-1")
///     .assert_expires_in(3600);
/// ```
pub trait TokenAssertions {
    /// Three segments, RS512 header, decodable claims
    fn assert_valid_jwt(&self) -> &Self;

    fn assert_for_subject(&self, subject: &str) -> &Self;

    /// `exp - iat` equals `seconds`
    fn assert_expires_in(&self, seconds: i64) -> &Self;

    fn assert_admin(&self, admin: bool) -> &Self;

    /// `trace` is a UUID
    fn assert_has_trace(&self) -> &Self;
}

fn segment<'a>(token: &'a str, index: usize) -> &'a str {
    token
        .split('.')
        .nth(index)
        .unwrap_or_else(|| panic!("JWT is missing segment {}", index))
}

fn header(token: &str) -> JwtHeader {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment(token, 0))
        .expect("JWT header should be base64url");
    serde_json::from_slice(&bytes).expect("JWT header should be JSON")
}

fn claims(token: &str) -> JwtClaims {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment(token, 1))
        .expect("JWT payload should be base64url");
    serde_json::from_slice(&bytes).expect("JWT payload should hold sub/iat/exp")
}

impl TokenAssertions for str {
    fn assert_valid_jwt(&self) -> &Self {
        let parts = self.split('.').count();
        assert_eq!(
            parts, 3,
            "JWT must have 3 parts (header.payload.signature), got {}",
            parts
        );

        let header = header(self);
        assert_eq!(header.alg, "RS512", "Expected RS512 algorithm");
        assert_eq!(header.typ.as_deref(), Some("JWT"), "Expected JWT type");

        claims(self);
        assert!(!segment(self, 2).is_empty(), "JWT signature is empty");
        self
    }

    fn assert_for_subject(&self, subject: &str) -> &Self {
        assert_eq!(claims(self).sub, subject, "Unexpected token subject");
        self
    }

    fn assert_expires_in(&self, seconds: i64) -> &Self {
        let claims = claims(self);
        assert_eq!(claims.exp - claims.iat, seconds, "Unexpected token lifetime");
        self
    }

    fn assert_admin(&self, admin: bool) -> &Self {
        assert_eq!(claims(self).admin, admin.to_string(), "Unexpected admin claim");
        self
    }

    fn assert_has_trace(&self) -> &Self {
        let trace = claims(self).trace;
        assert!(
            uuid::Uuid::parse_str(&trace).is_ok(),
            "trace claim should be a UUID, got '{}'",
            trace
        );
        self
    }
}

impl TokenAssertions for String {
    fn assert_valid_jwt(&self) -> &Self {
        self.as_str().assert_valid_jwt();
        self
    }

    fn assert_for_subject(&self, subject: &str) -> &Self {
        self.as_str().assert_for_subject(subject);
        self
    }

    fn assert_expires_in(&self, seconds: i64) -> &Self {
        self.as_str().assert_expires_in(seconds);
        self
    }

    fn assert_admin(&self, admin: bool) -> &Self {
        self.as_str().assert_admin(admin);
        self
    }

    fn assert_has_trace(&self) -> &Self {
        self.as_str().assert_has_trace();
        self
    }
}
