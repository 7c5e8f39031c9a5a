//! Logout and revocation behaviour
//!
//! The mock cache expires entries on tokio time, so paused-clock tests can
//! step past a revocation TTL without waiting.

use auth_service::{AuthError, BackendSettings};
use auth_test_utils::{
    test_backend_with, MockCredentialStore, MockRevocationCache, TestTokenBuilder,
};
use chrono::Utc;
use std::time::Duration;

fn settings(lifetime: i64, grace: u64) -> BackendSettings {
    BackendSettings {
        token_lifetime_seconds: lifetime,
        revocation_grace_seconds: grace,
        ..BackendSettings::default()
    }
}

fn assert_ttl_within_one(actual: Option<u64>, expected: u64) {
    let actual = actual.expect("revocation marker should exist");
    assert!(
        actual.abs_diff(expected) <= 1,
        "expected TTL {} (+/-1), got {}",
        expected,
        actual
    );
}

#[tokio::test]
async fn test_logout_revokes_token() -> Result<(), anyhow::Error> {
    let cache = MockRevocationCache::new();
    let backend = test_backend_with(cache.clone(), MockCredentialStore::new(), settings(3600, 3600));

    let token = backend.issue_token("user-1")?;
    let claims = backend.validate(&token).await?;

    backend.logout(&token, &claims).await?;

    assert!(matches!(
        backend.validate(&token).await,
        Err(AuthError::TokenRevoked)
    ));
    // Marker key and value are both the raw token.
    assert_eq!(cache.value_of(&token).as_deref(), Some(token.as_str()));

    Ok(())
}

#[tokio::test]
async fn test_revocation_ttl_is_remaining_validity_plus_grace() -> Result<(), anyhow::Error> {
    let cache = MockRevocationCache::new();
    let backend = test_backend_with(cache.clone(), MockCredentialStore::new(), settings(120, 3600));

    let token = backend.issue_token("user-1")?;
    let claims = backend.validate(&token).await?;
    backend.logout(&token, &claims).await?;

    assert_ttl_within_one(cache.ttl_of(&token), 120 + 3600);
    Ok(())
}

#[tokio::test]
async fn test_logout_token_sizes_ttl_from_unverified_exp() -> Result<(), anyhow::Error> {
    let cache = MockRevocationCache::new();
    let backend = test_backend_with(cache.clone(), MockCredentialStore::new(), settings(600, 30));

    let token = backend.issue_token("user-1")?;
    backend.logout_token(&token).await?;

    assert_ttl_within_one(cache.ttl_of(&token), 600 + 30);
    assert!(matches!(
        backend.validate(&token).await,
        Err(AuthError::TokenRevoked)
    ));
    Ok(())
}

#[tokio::test]
async fn test_logout_of_expired_token_uses_grace_only() -> Result<(), anyhow::Error> {
    let cache = MockRevocationCache::new();
    let backend = test_backend_with(cache.clone(), MockCredentialStore::new(), settings(3600, 45));

    let token = TestTokenBuilder::new().expires_in(-500).sign_rs512();
    backend.logout_token(&token).await?;

    assert_eq!(cache.ttl_of(&token), Some(45));
    Ok(())
}

#[tokio::test]
async fn test_logout_of_token_without_exp_uses_grace_only() -> Result<(), anyhow::Error> {
    let cache = MockRevocationCache::new();
    let backend = test_backend_with(cache.clone(), MockCredentialStore::new(), settings(3600, 45));

    let token = TestTokenBuilder::new().without_exp().sign_rs512();
    backend.logout_token(&token).await?;
    backend.logout_token("not-even-a-jwt").await?;

    assert_eq!(cache.ttl_of(&token), Some(45));
    assert_eq!(cache.ttl_of("not-even-a-jwt"), Some(45));
    Ok(())
}

#[tokio::test]
async fn test_revoking_one_token_leaves_others_valid() -> Result<(), anyhow::Error> {
    let cache = MockRevocationCache::new();
    let backend = test_backend_with(cache, MockCredentialStore::new(), settings(3600, 3600));

    let first = backend.issue_token("user-1")?;
    let second = backend.issue_token("user-1")?;
    assert_ne!(first, second);

    backend.logout_token(&first).await?;

    assert!(backend.validate(&first).await.is_err());
    backend.validate(&second).await?;
    Ok(())
}

#[tokio::test]
async fn test_logout_is_idempotent() -> Result<(), anyhow::Error> {
    let cache = MockRevocationCache::new();
    let backend = test_backend_with(cache.clone(), MockCredentialStore::new(), settings(3600, 10));

    let token = backend.issue_token("user-1")?;
    backend.logout_token(&token).await?;
    backend.logout_token(&token).await?;

    assert_eq!(cache.len(), 1);
    assert!(matches!(
        backend.validate(&token).await,
        Err(AuthError::TokenRevoked)
    ));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_revocation_holds_until_ttl_elapses() -> Result<(), anyhow::Error> {
    let cache = MockRevocationCache::new();
    let backend = test_backend_with(cache.clone(), MockCredentialStore::new(), settings(3600, 10));

    let token = backend.issue_token("user-1")?;
    backend.logout_token(&token).await?;
    let ttl = cache.ttl_of(&token).expect("marker written");

    tokio::time::advance(Duration::from_secs(ttl - 1)).await;
    assert!(matches!(
        backend.validate(&token).await,
        Err(AuthError::TokenRevoked)
    ));

    // Token signature and exp are still checked against the wall clock,
    // which paused tokio time does not move; only the marker expires.
    tokio::time::advance(Duration::from_secs(1)).await;
    assert!(cache.ttl_of(&token).is_none());
    backend.validate(&token).await?;

    Ok(())
}

#[tokio::test]
async fn test_validate_consults_revocation_store_every_time() -> Result<(), anyhow::Error> {
    let cache = MockRevocationCache::new();
    let backend = test_backend_with(cache.clone(), MockCredentialStore::new(), settings(3600, 10));

    let token = backend.issue_token("user-1")?;
    for _ in 0..3 {
        backend.validate(&token).await?;
    }

    assert_eq!(cache.exists_calls(), 3);
    Ok(())
}

#[tokio::test]
async fn test_invalid_token_never_reaches_revocation_store() {
    let cache = MockRevocationCache::new();
    let backend = test_backend_with(cache.clone(), MockCredentialStore::new(), settings(3600, 10));

    let expired = TestTokenBuilder::new().expires_in(-10).sign_rs512();
    let _ = backend.validate(&expired).await;
    let _ = backend.validate("garbage").await;

    assert_eq!(cache.exists_calls(), 0);
}

#[tokio::test]
async fn test_remaining_validity_matches_claims() -> Result<(), anyhow::Error> {
    let cache = MockRevocationCache::new();
    let backend = test_backend_with(cache.clone(), MockCredentialStore::new(), settings(900, 0));

    let token = backend.issue_token("user-1")?;
    let claims = backend.validate(&token).await?;
    let expected = claims.remaining_validity_seconds(Utc::now().timestamp());

    backend.logout(&token, &claims).await?;

    assert_ttl_within_one(cache.ttl_of(&token), u64::try_from(expected)?);
    Ok(())
}
