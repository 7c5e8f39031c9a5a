//! In-memory revocation cache.
//!
//! Behaves like Redis `SET EX` / `EXISTS`: entries disappear once their TTL
//! has elapsed. Expiry uses `tokio::time::Instant`, so tests running with
//! paused time can `tokio::time::advance` past a TTL.
//!
//! # Example
//!
//! ```rust,ignore
//! let cache = MockRevocationCache::new();
//! let backend = test_backend(cache.clone(), MockCredentialStore::new());
//!
//! backend.logout_token(&token).await?;
//! assert_eq!(cache.ttl_of(&token), Some(3600 + 3600));
//!
//! cache.set_unavailable(true);
//! assert!(backend.validate(&token).await.is_err());
//! ```

use async_trait::async_trait;
use auth_service::{AuthError, RevocationCache};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Default)]
pub struct MockRevocationCache {
    inner: Arc<Mutex<MockRevocationCacheInner>>,
}

#[derive(Debug, Default)]
struct MockRevocationCacheInner {
    entries: HashMap<String, Entry>,
    unavailable: bool,
    latency: Option<Duration>,
    set_calls: usize,
    exists_calls: usize,
}

#[derive(Debug)]
struct Entry {
    value: String,
    ttl_seconds: u64,
    expires_at: Instant,
}

impl MockRevocationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails with `RevocationStoreUnavailable`.
    pub fn unavailable() -> Self {
        let cache = Self::new();
        cache.set_unavailable(true);
        cache
    }

    /// Every call sleeps for `latency` before answering.
    pub fn with_latency(self, latency: Duration) -> Self {
        self.inner.lock().unwrap().latency = Some(latency);
        self
    }

    /// Toggle failure mode on a cache already handed to a backend.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.inner.lock().unwrap().unavailable = unavailable;
    }

    /// TTL passed when `key` was last written, if it is still live.
    pub fn ttl_of(&self, key: &str) -> Option<u64> {
        let inner = self.inner.lock().unwrap();
        inner
            .entries
            .get(key)
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.ttl_seconds)
    }

    pub fn value_of(&self, key: &str) -> Option<String> {
        let inner = self.inner.lock().unwrap();
        inner
            .entries
            .get(key)
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.value.clone())
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        let inner = self.inner.lock().unwrap();
        inner.entries.values().filter(|e| e.expires_at > now).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn set_calls(&self) -> usize {
        self.inner.lock().unwrap().set_calls
    }

    pub fn exists_calls(&self) -> usize {
        self.inner.lock().unwrap().exists_calls
    }

    async fn simulate_latency(&self) {
        let latency = self.inner.lock().unwrap().latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl RevocationCache for MockRevocationCache {
    async fn set_with_ttl(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), AuthError> {
        self.simulate_latency().await;

        let mut inner = self.inner.lock().unwrap();
        inner.set_calls += 1;
        if inner.unavailable {
            return Err(AuthError::RevocationStoreUnavailable(
                "mock cache unavailable".to_string(),
            ));
        }

        inner.entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                ttl_seconds,
                expires_at: Instant::now() + Duration::from_secs(ttl_seconds),
            },
        );
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, AuthError> {
        self.simulate_latency().await;

        let mut inner = self.inner.lock().unwrap();
        inner.exists_calls += 1;
        if inner.unavailable {
            return Err(AuthError::RevocationStoreUnavailable(
                "mock cache unavailable".to_string(),
            ));
        }

        let now = Instant::now();
        let live = match inner.entries.get(key) {
            Some(entry) => entry.expires_at > now,
            None => false,
        };
        if !live {
            inner.entries.remove(key);
        }
        Ok(live)
    }
}
