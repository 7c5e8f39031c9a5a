//! # Auth Test Utilities
//!
//! Shared test utilities for the token authentication service.
//!
//! This crate provides:
//! - Fixed RSA/EC key fixtures and on-disk key files
//! - In-memory revocation cache and credential store mocks
//! - Test claim builders for hand-crafted tokens
//! - Custom assertions (TokenAssertions trait)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use auth_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() {
//!     let cache = MockRevocationCache::new();
//!     let users = MockCredentialStore::new().with_user("alice", "user-1", "pw");
//!     let backend = test_backend(cache.clone(), users);
//!
//!     let token = backend.issue_token("user-1").unwrap();
//!     token.assert_valid_jwt().assert_for_subject("user-1");
//! }
//! ```

pub mod assertions;
pub mod crypto_fixtures;
pub mod mock_credentials;
pub mod mock_revocation;
pub mod token_builders;

// Re-export commonly used items
pub use assertions::*;
pub use crypto_fixtures::*;
pub use mock_credentials::*;
pub use mock_revocation::*;
pub use token_builders::*;

use auth_service::{AuthenticationBackend, BackendSettings, KeyStore};
use std::sync::Arc;

/// Backend over the primary fixture key pair with default settings.
pub fn test_backend(
    cache: MockRevocationCache,
    credentials: MockCredentialStore,
) -> AuthenticationBackend {
    test_backend_with(cache, credentials, BackendSettings::default())
}

pub fn test_backend_with(
    cache: MockRevocationCache,
    credentials: MockCredentialStore,
    settings: BackendSettings,
) -> AuthenticationBackend {
    let keys = KeyStore::from_pem(PRIVATE_KEY_PEM, PUBLIC_KEY_PEM)
        .expect("fixture key pair should load");
    AuthenticationBackend::new(keys, settings, Arc::new(cache), Arc::new(credentials))
}
