//! Backend construction from configuration and key files

use auth_service::{AuthError, AuthenticationBackend, Config, RevocationFailurePolicy};
use auth_test_utils::{
    MockCredentialStore, MockRevocationCache, TestKeyFiles, TokenAssertions, EC_PRIVATE_KEY_PEM,
    PRIVATE_KEY_PEM, PUBLIC_KEY_PEM, SECONDARY_PUBLIC_KEY_PEM,
};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

fn config_for(private_key: &Path, public_key: &Path, extra: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> = HashMap::from([
        ("REDIS_URL".to_string(), "redis://localhost:6379".to_string()),
        (
            "AUTH_PRIVATE_KEY_PATH".to_string(),
            private_key.display().to_string(),
        ),
        (
            "AUTH_PUBLIC_KEY_PATH".to_string(),
            public_key.display().to_string(),
        ),
    ]);
    for (key, value) in extra {
        vars.insert(key.to_string(), value.to_string());
    }
    Config::from_vars(&vars).expect("test config should parse")
}

fn initialize(config: &Config) -> Result<AuthenticationBackend, AuthError> {
    AuthenticationBackend::initialize(
        config,
        Arc::new(MockRevocationCache::new()),
        Arc::new(MockCredentialStore::new()),
    )
}

#[tokio::test]
async fn test_initialize_from_key_files() -> Result<(), anyhow::Error> {
    let files = TestKeyFiles::new();
    let config = config_for(&files.private_key_path, &files.public_key_path, &[]);

    let backend = initialize(&config)?;
    let token = backend.issue_token("user-1")?;

    backend.validate(&token).await?;
    Ok(())
}

#[tokio::test]
async fn test_initialize_applies_config_settings() -> Result<(), anyhow::Error> {
    let files = TestKeyFiles::new();
    let config = config_for(
        &files.private_key_path,
        &files.public_key_path,
        &[
            ("AUTH_TOKEN_LIFETIME_SECONDS", "300"),
            ("AUTH_ADMIN_CLAIM", "true"),
            ("AUTH_REVOCATION_FAILURE_POLICY", "fail_open"),
        ],
    );
    assert_eq!(
        config.revocation_failure_policy,
        RevocationFailurePolicy::FailOpen
    );

    let backend = initialize(&config)?;
    backend
        .issue_token("user-1")?
        .assert_expires_in(300)
        .assert_admin(true);
    Ok(())
}

#[test]
fn test_initialize_missing_private_key_file() {
    let files = TestKeyFiles::new();
    let missing = files.private_key_path.with_file_name("absent.pem");
    let config = config_for(&missing, &files.public_key_path, &[]);

    assert!(matches!(
        initialize(&config),
        Err(AuthError::KeyLoadFailure(msg)) if msg.contains("absent.pem")
    ));
}

#[test]
fn test_initialize_missing_public_key_file() {
    let files = TestKeyFiles::new();
    let missing = files.public_key_path.with_file_name("absent.pem");
    let config = config_for(&files.private_key_path, &missing, &[]);

    assert!(matches!(
        initialize(&config),
        Err(AuthError::KeyLoadFailure(_))
    ));
}

#[test]
fn test_initialize_rejects_wrong_key_type() {
    let files = TestKeyFiles::with_contents(EC_PRIVATE_KEY_PEM, PUBLIC_KEY_PEM);
    let config = config_for(&files.private_key_path, &files.public_key_path, &[]);

    assert!(matches!(
        initialize(&config),
        Err(AuthError::KeyLoadFailure(_))
    ));
}

#[test]
fn test_initialize_rejects_mismatched_pair() {
    let files = TestKeyFiles::with_contents(PRIVATE_KEY_PEM, SECONDARY_PUBLIC_KEY_PEM);
    let config = config_for(&files.private_key_path, &files.public_key_path, &[]);

    assert!(matches!(
        initialize(&config),
        Err(AuthError::KeyLoadFailure(msg)) if msg.contains("does not match")
    ));
}

#[test]
fn test_initialize_rejects_empty_files() {
    let files = TestKeyFiles::with_contents("", "");
    let config = config_for(&files.private_key_path, &files.public_key_path, &[]);

    assert!(matches!(
        initialize(&config),
        Err(AuthError::KeyLoadFailure(_))
    ));
}
