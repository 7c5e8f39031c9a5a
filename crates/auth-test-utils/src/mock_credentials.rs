//! In-memory credential store.

use async_trait::async_trait;
use auth_service::{AuthError, CredentialStore, StoredCredential};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// bcrypt's minimum cost; keeps hashing fast in tests.
pub const TEST_BCRYPT_COST: u32 = 4;

#[derive(Debug, Clone, Default)]
pub struct MockCredentialStore {
    inner: Arc<Mutex<MockCredentialStoreInner>>,
}

#[derive(Debug, Default)]
struct MockCredentialStoreInner {
    users: HashMap<String, StoredCredential>,
    unavailable: bool,
    lookups: usize,
}

impl MockCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `username` with a bcrypt hash of `password`.
    pub fn with_user(self, username: &str, subject: &str, password: &str) -> Self {
        let password_hash =
            bcrypt::hash(password, TEST_BCRYPT_COST).expect("bcrypt hash of test password");
        self.with_hash(username, subject, &password_hash)
    }

    /// Register `username` with a precomputed (possibly corrupt) hash.
    pub fn with_hash(self, username: &str, subject: &str, password_hash: &str) -> Self {
        self.inner.lock().unwrap().users.insert(
            username.to_string(),
            StoredCredential {
                subject: subject.to_string(),
                password_hash: password_hash.to_string(),
            },
        );
        self
    }

    /// Every lookup fails with `CredentialStoreUnavailable`.
    pub fn unavailable() -> Self {
        let store = Self::new();
        store.inner.lock().unwrap().unavailable = true;
        store
    }

    pub fn lookups(&self) -> usize {
        self.inner.lock().unwrap().lookups
    }
}

#[async_trait]
impl CredentialStore for MockCredentialStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<StoredCredential>, AuthError> {
        let mut inner = self.inner.lock().unwrap();
        inner.lookups += 1;
        if inner.unavailable {
            return Err(AuthError::CredentialStoreUnavailable(
                "mock credential store unavailable".to_string(),
            ));
        }
        Ok(inner.users.get(username).cloned())
    }
}
