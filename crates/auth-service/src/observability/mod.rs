//! Tracing setup and log-safe field helpers.
//!
//! # Privacy by Default
//!
//! Instrumented functions use `#[instrument(skip_all)]` and add fields
//! explicitly. Fields fall into three groups:
//! - **SAFE**: logged as-is (outcomes, error categories, TTLs)
//! - **HASHED**: subjects and usernames, logged via [`hash_for_correlation`]
//! - **NEVER**: tokens, keys, passwords

pub mod metrics;

use sha2::{Digest, Sha256};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "auth_service=debug";

/// Hash a field value for correlation in logs (SHA-256, first 8 hex chars).
///
/// One-way but not a secret-grade hash; used only so related log lines can
/// be joined without storing the identifier in plaintext.
pub fn hash_for_correlation(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    hex::encode(digest.get(..4).unwrap_or_default())
}

/// Install the global tracing subscriber (env filter + fmt layer).
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing() -> Result<(), tracing_subscriber::util::TryInitError> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()
}
