//! Redis-backed revocation cache.
//!
//! Revocation markers are plain string keys written with `SET key value EX ttl`
//! and probed with `EXISTS key`. Redis expires them; this module never deletes.
//!
//! # Connection Pattern
//!
//! `MultiplexedConnection` is cheap to clone and safe to use concurrently, so
//! each call clones it instead of sharing a locked connection.

use crate::errors::AuthError;
use crate::services::revocation::RevocationCache;
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client};
use tracing::{error, instrument, warn};

#[derive(Clone)]
pub struct RedisRevocationCache {
    connection: MultiplexedConnection,
}

impl RedisRevocationCache {
    /// Connect to Redis.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::RevocationStoreUnavailable` if the URL is invalid or
    /// the connection cannot be established.
    pub async fn new(redis_url: &str) -> Result<Self, AuthError> {
        let client = Client::open(redis_url).map_err(|e| {
            // The URL may carry a password; log the error only.
            error!(target: "auth.redis", error = %e, "Failed to open Redis client");
            AuthError::RevocationStoreUnavailable(format!("Failed to open Redis client: {e}"))
        })?;

        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| {
                error!(target: "auth.redis", error = %e, "Failed to connect to Redis");
                AuthError::RevocationStoreUnavailable(format!("Failed to connect to Redis: {e}"))
            })?;

        Ok(Self { connection })
    }
}

impl std::fmt::Debug for RedisRevocationCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisRevocationCache").finish_non_exhaustive()
    }
}

#[async_trait]
impl RevocationCache for RedisRevocationCache {
    #[instrument(skip_all, fields(ttl_seconds = ttl_seconds))]
    async fn set_with_ttl(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), AuthError> {
        let mut conn = self.connection.clone();

        conn.set_ex::<_, _, ()>(key, value, ttl_seconds)
            .await
            .map_err(|e| {
                warn!(target: "auth.redis", error = %e, "Failed to write revocation marker");
                AuthError::RevocationStoreUnavailable(format!("SET EX failed: {e}"))
            })
    }

    #[instrument(skip_all)]
    async fn exists(&self, key: &str) -> Result<bool, AuthError> {
        let mut conn = self.connection.clone();

        conn.exists::<_, bool>(key).await.map_err(|e| {
            warn!(target: "auth.redis", error = %e, "Failed to check revocation marker");
            AuthError::RevocationStoreUnavailable(format!("EXISTS failed: {e}"))
        })
    }
}
