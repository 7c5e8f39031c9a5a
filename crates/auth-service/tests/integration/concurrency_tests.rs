//! Concurrent issue/validate/logout against one shared backend

use auth_service::AuthError;
use auth_test_utils::{test_backend, MockCredentialStore, MockRevocationCache};
use futures::future::join_all;
use std::sync::Arc;

const TASKS: usize = 64;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_issue_and_validate() -> Result<(), anyhow::Error> {
    let backend = Arc::new(test_backend(
        MockRevocationCache::new(),
        MockCredentialStore::new(),
    ));

    let handles = (0..TASKS).map(|i| {
        let backend = Arc::clone(&backend);
        tokio::spawn(async move {
            let subject = format!("user-{}", i);
            let token = backend.issue_token(&subject)?;
            let claims = backend.validate(&token).await?;
            Ok::<_, AuthError>((subject, claims.sub))
        })
    });

    for result in join_all(handles).await {
        let (expected, actual) = result??;
        assert_eq!(expected, actual);
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_logout_only_affects_own_tokens() -> Result<(), anyhow::Error> {
    let cache = MockRevocationCache::new();
    let backend = Arc::new(test_backend(cache.clone(), MockCredentialStore::new()));

    let tokens: Vec<String> = (0..TASKS)
        .map(|i| backend.issue_token(&format!("user-{}", i)))
        .collect::<Result<_, _>>()?;

    // Revoke every even-indexed token concurrently.
    let revocations = tokens.iter().step_by(2).map(|token| {
        let backend = Arc::clone(&backend);
        let token = token.clone();
        tokio::spawn(async move { backend.logout_token(&token).await })
    });
    for result in join_all(revocations).await {
        result??;
    }

    let validations = tokens.iter().cloned().enumerate().map(|(i, token)| {
        let backend = Arc::clone(&backend);
        tokio::spawn(async move { (i, backend.validate(&token).await) })
    });
    for result in join_all(validations).await {
        let (i, outcome) = result?;
        if i % 2 == 0 {
            assert!(matches!(outcome, Err(AuthError::TokenRevoked)), "token {} should be revoked", i);
        } else {
            assert!(outcome.is_ok(), "token {} should be valid: {:?}", i, outcome);
        }
    }

    assert_eq!(cache.len(), TASKS / 2);
    Ok(())
}
