//! Builder patterns for test tokens
//!
//! Produces tokens the issuer never would: expired, wrong algorithm, future
//! `iat`, missing claims, signed by a foreign key.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::json;

use crate::crypto_fixtures::PRIVATE_KEY_PEM;

/// Builder for hand-crafted test tokens
///
/// # Example
/// ```rust,ignore
/// let token = TestTokenBuilder::new()
///     .for_user("alice")
///     .expires_in(-60)
///     .sign_rs512();
/// ```
pub struct TestTokenBuilder {
    sub: String,
    iat: i64,
    exp: i64,
    admin: String,
    trace: String,
    omit_exp: bool,
}

impl TestTokenBuilder {
    /// Create a new token builder with defaults
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            sub: "test-subject".to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(3600)).timestamp(),
            admin: "false".to_string(),
            trace: uuid::Uuid::new_v4().to_string(),
            omit_exp: false,
        }
    }

    pub fn for_user(mut self, subject: &str) -> Self {
        self.sub = subject.to_string();
        self
    }

    /// Set expiration in seconds from now (negative for already expired)
    pub fn expires_in(mut self, seconds: i64) -> Self {
        self.exp = (Utc::now() + Duration::seconds(seconds)).timestamp();
        self
    }

    pub fn expires_at(mut self, timestamp: i64) -> Self {
        self.exp = timestamp;
        self
    }

    pub fn issued_at(mut self, timestamp: i64) -> Self {
        self.iat = timestamp;
        self
    }

    pub fn admin(mut self, admin: bool) -> Self {
        self.admin = admin.to_string();
        self
    }

    pub fn without_exp(mut self) -> Self {
        self.omit_exp = true;
        self
    }

    /// Build the claims as a JSON value
    pub fn build(&self) -> serde_json::Value {
        let mut claims = json!({
            "sub": self.sub,
            "iat": self.iat,
            "exp": self.exp,
            "admin": self.admin,
            "trace": self.trace,
        });
        if self.omit_exp {
            if let Some(object) = claims.as_object_mut() {
                object.remove("exp");
            }
        }
        claims
    }

    /// Sign with the primary fixture key.
    pub fn sign_rs512(&self) -> String {
        self.sign_rs512_with(PRIVATE_KEY_PEM)
    }

    /// Sign with any PEM RSA private key.
    pub fn sign_rs512_with(&self, private_key_pem: &str) -> String {
        self.sign_rsa(Algorithm::RS512, private_key_pem)
    }

    /// Sign with any RSA algorithm, e.g. RS256 to exercise algorithm pinning.
    pub fn sign_rsa(&self, algorithm: Algorithm, private_key_pem: &str) -> String {
        let key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())
            .expect("fixture RSA key should parse");
        encode(&Header::new(algorithm), &self.build(), &key).expect("signing test token")
    }

    /// HMAC-sign with `secret`, as an algorithm-confusion attacker would.
    pub fn sign_hs256(&self, secret: &[u8]) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            &self.build(),
            &EncodingKey::from_secret(secret),
        )
        .expect("signing test token")
    }

    /// Unsigned token with `{"alg":"none"}`.
    pub fn unsigned(&self) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(self.build().to_string());
        format!("{}.{}.", header, payload)
    }
}

impl Default for TestTokenBuilder {
    fn default() -> Self {
        Self::new()
    }
}
