//! Fault injection tests for credential store outages

use auth_service::models::Credentials;
use auth_service::AuthError;
use auth_test_utils::{test_backend, MockCredentialStore, MockRevocationCache};

#[tokio::test]
async fn test_authenticate_reports_store_outage() {
    let store = MockCredentialStore::unavailable();
    let backend = test_backend(MockRevocationCache::new(), store.clone());

    let result = backend
        .authenticate(&Credentials::new("alice", "password"))
        .await;

    assert!(matches!(result, Err(AuthError::CredentialStoreUnavailable(_))));
    assert_eq!(store.lookups(), 1);
}

#[tokio::test]
async fn test_login_outage_is_not_invalid_credentials() {
    let backend = test_backend(
        MockRevocationCache::new(),
        MockCredentialStore::unavailable(),
    );

    let result = backend.login(&Credentials::new("alice", "password")).await;

    assert!(matches!(result, Err(AuthError::CredentialStoreUnavailable(_))));
}

#[tokio::test]
async fn test_outage_error_does_not_leak_password() {
    let backend = test_backend(
        MockRevocationCache::new(),
        MockCredentialStore::unavailable(),
    );

    let err = backend
        .login(&Credentials::new("alice", "s3cret-value"))
        .await
        .unwrap_err();

    assert!(!err.to_string().contains("s3cret-value"));
}
