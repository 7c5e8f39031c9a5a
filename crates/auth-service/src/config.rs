//! Authentication service configuration.
//!
//! Configuration is loaded from environment variables. The Redis URL may carry
//! credentials and is redacted in Debug output.

use crate::services::revocation::RevocationFailurePolicy;
use secrecy::SecretString;
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_PRIVATE_KEY_PATH: &str = "settings/keys/private_key.pem";

pub const DEFAULT_PUBLIC_KEY_PATH: &str = "settings/keys/public_key.pem";

/// Default token lifetime (1 hour).
pub const DEFAULT_TOKEN_LIFETIME_SECONDS: i64 = 3600;

/// Default grace offset added to every revocation TTL (1 hour).
pub const DEFAULT_REVOCATION_GRACE_SECONDS: u64 = 3600;

pub const DEFAULT_REVOCATION_TIMEOUT_MS: u64 = 500;

/// Default JWT clock skew tolerance for `iat` validation (5 minutes).
pub const DEFAULT_JWT_CLOCK_SKEW: Duration = Duration::from_secs(300);

/// Upper bound on the configurable clock skew (10 minutes).
pub const MAX_JWT_CLOCK_SKEW: Duration = Duration::from_secs(600);

#[derive(Clone)]
pub struct Config {
    pub private_key_path: PathBuf,
    pub public_key_path: PathBuf,
    /// Lifetime of issued tokens; `exp = iat + token_lifetime_seconds`.
    pub token_lifetime_seconds: i64,
    pub revocation_grace_seconds: u64,
    /// Bound on each revocation store round trip.
    pub revocation_timeout: Duration,
    pub revocation_failure_policy: RevocationFailurePolicy,
    pub jwt_clock_skew: Duration,
    /// Value of the `admin` claim stamped into issued tokens.
    pub admin_claim: bool,
    /// Protected by `SecretString` to prevent accidental logging.
    pub redis_url: SecretString,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("private_key_path", &self.private_key_path)
            .field("public_key_path", &self.public_key_path)
            .field("token_lifetime_seconds", &self.token_lifetime_seconds)
            .field("revocation_grace_seconds", &self.revocation_grace_seconds)
            .field("revocation_timeout", &self.revocation_timeout)
            .field("revocation_failure_policy", &self.revocation_failure_policy)
            .field("jwt_clock_skew", &self.jwt_clock_skew)
            .field("admin_claim", &self.admin_claim)
            .field("redis_url", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing)
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let redis_url = SecretString::from(
            vars.get("REDIS_URL")
                .ok_or_else(|| ConfigError::MissingEnvVar("REDIS_URL".to_string()))?
                .clone(),
        );

        let private_key_path = vars
            .get("AUTH_PRIVATE_KEY_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PRIVATE_KEY_PATH));

        let public_key_path = vars
            .get("AUTH_PUBLIC_KEY_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PUBLIC_KEY_PATH));

        let token_lifetime_seconds: i64 = parse_var(
            vars,
            "AUTH_TOKEN_LIFETIME_SECONDS",
            DEFAULT_TOKEN_LIFETIME_SECONDS,
        )?;
        if token_lifetime_seconds <= 0 {
            return Err(ConfigError::InvalidValue(format!(
                "AUTH_TOKEN_LIFETIME_SECONDS must be positive, got {}",
                token_lifetime_seconds
            )));
        }

        let revocation_grace_seconds = parse_var(
            vars,
            "AUTH_REVOCATION_GRACE_SECONDS",
            DEFAULT_REVOCATION_GRACE_SECONDS,
        )?;

        let revocation_timeout_ms: u64 = parse_var(
            vars,
            "AUTH_REVOCATION_TIMEOUT_MS",
            DEFAULT_REVOCATION_TIMEOUT_MS,
        )?;
        if revocation_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "AUTH_REVOCATION_TIMEOUT_MS must be positive".to_string(),
            ));
        }

        let revocation_failure_policy = parse_var(
            vars,
            "AUTH_REVOCATION_FAILURE_POLICY",
            RevocationFailurePolicy::default(),
        )?;

        let clock_skew_seconds: u64 = parse_var(
            vars,
            "AUTH_JWT_CLOCK_SKEW_SECONDS",
            DEFAULT_JWT_CLOCK_SKEW.as_secs(),
        )?;
        if clock_skew_seconds == 0 || clock_skew_seconds > MAX_JWT_CLOCK_SKEW.as_secs() {
            return Err(ConfigError::InvalidValue(format!(
                "AUTH_JWT_CLOCK_SKEW_SECONDS must be between 1 and {}, got {}",
                MAX_JWT_CLOCK_SKEW.as_secs(),
                clock_skew_seconds
            )));
        }

        let admin_claim = parse_var(vars, "AUTH_ADMIN_CLAIM", false)?;

        Ok(Config {
            private_key_path,
            public_key_path,
            token_lifetime_seconds,
            revocation_grace_seconds,
            revocation_timeout: Duration::from_millis(revocation_timeout_ms),
            revocation_failure_policy,
            jwt_clock_skew: Duration::from_secs(clock_skew_seconds),
            admin_claim,
            redis_url,
        })
    }
}

fn parse_var<T>(vars: &HashMap<String, String>, name: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match vars.get(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| ConfigError::InvalidValue(format!("{}={:?}: {}", name, raw, e))),
        None => Ok(default),
    }
}
