//! Metrics emitted by backend operations
//!
//! Uses a thread-local debugging recorder; the default `#[tokio::test]`
//! runtime is single-threaded so every recorded metric lands on it.

use auth_test_utils::{test_backend, MockCredentialStore, MockRevocationCache};
use metrics_util::debugging::{DebugValue, DebuggingRecorder, Snapshotter};
use metrics_util::MetricKind;

fn counter(snapshotter: &Snapshotter, name: &str, label: (&str, &str)) -> u64 {
    snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .filter(|(key, _, _, _)| {
            key.kind() == MetricKind::Counter
                && key.key().name() == name
                && key
                    .key()
                    .labels()
                    .any(|l| l.key() == label.0 && l.value() == label.1)
        })
        .map(|(_, _, _, value)| match value {
            DebugValue::Counter(v) => v,
            _ => 0,
        })
        .sum()
}

#[tokio::test]
async fn test_backend_operations_emit_metrics() -> Result<(), anyhow::Error> {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    let _guard = metrics::set_default_local_recorder(&recorder);

    let backend = test_backend(MockRevocationCache::new(), MockCredentialStore::new());

    let token = backend.issue_token("user-1")?;
    backend.validate(&token).await?;
    backend.logout_token(&token).await?;
    let _ = backend.validate(&token).await;
    let _ = backend.validate("garbage").await;

    assert_eq!(
        counter(&snapshotter, "auth_token_issuance_total", ("status", "success")),
        1
    );
    assert_eq!(
        counter(&snapshotter, "auth_token_validations_total", ("status", "success")),
        1
    );
    assert_eq!(
        counter(&snapshotter, "auth_token_validations_total", ("error_category", "revoked")),
        1
    );
    assert_eq!(
        counter(&snapshotter, "auth_token_validations_total", ("error_category", "invalid_token")),
        1
    );
    assert_eq!(
        counter(&snapshotter, "auth_revocations_total", ("status", "success")),
        1
    );
    assert_eq!(
        counter(&snapshotter, "auth_revocation_checks_total", ("outcome", "not_revoked")),
        1
    );
    assert_eq!(
        counter(&snapshotter, "auth_revocation_checks_total", ("outcome", "revoked")),
        1
    );
    Ok(())
}

#[tokio::test]
async fn test_unavailable_store_is_counted() -> Result<(), anyhow::Error> {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    let _guard = metrics::set_default_local_recorder(&recorder);

    let backend = test_backend(MockRevocationCache::unavailable(), MockCredentialStore::new());
    let token = backend.issue_token("user-1")?;

    let _ = backend.validate(&token).await;
    let _ = backend.logout_token(&token).await;

    assert_eq!(
        counter(&snapshotter, "auth_revocation_checks_total", ("outcome", "unavailable")),
        1
    );
    assert_eq!(
        counter(&snapshotter, "auth_token_validations_total", ("error_category", "unavailable")),
        1
    );
    assert_eq!(
        counter(&snapshotter, "auth_revocations_total", ("status", "error")),
        1
    );
    Ok(())
}
