//! Revocation against a real Redis
//!
//! Requires a reachable server: `REDIS_URL=redis://localhost:6379 cargo test -- --ignored`

use auth_service::{RedisRevocationCache, RevocationCache, RevocationStore};
use std::time::Duration;

async fn connect() -> RedisRevocationCache {
    let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
    RedisRevocationCache::new(&url)
        .await
        .expect("Redis should be reachable for ignored tests")
}

#[tokio::test]
#[ignore = "requires a running Redis"]
async fn test_set_with_ttl_and_exists() -> Result<(), anyhow::Error> {
    let cache = connect().await;
    let key = format!("test-token-{}", uuid::Uuid::new_v4());

    assert!(!cache.exists(&key).await?);
    cache.set_with_ttl(&key, &key, 2).await?;
    assert!(cache.exists(&key).await?);

    tokio::time::sleep(Duration::from_millis(2100)).await;
    assert!(!cache.exists(&key).await?);
    Ok(())
}

#[tokio::test]
#[ignore = "requires a running Redis"]
async fn test_revocation_store_over_redis() -> Result<(), anyhow::Error> {
    let store = RevocationStore::new(
        std::sync::Arc::new(connect().await),
        5,
        Duration::from_millis(500),
    );
    let token = format!("test-token-{}", uuid::Uuid::new_v4());

    store.revoke(&token, -100).await?;
    assert!(store.is_revoked(&token).await?);
    Ok(())
}
