//! Fixed key material for tests.
//!
//! All keys were generated once with `openssl` and are checked in under
//! `fixtures/`. They protect nothing.

use std::path::PathBuf;
use tempfile::TempDir;

/// Primary 2048-bit RSA private key, PKCS#1 (`RSA PRIVATE KEY`).
pub const PRIVATE_KEY_PEM: &str = include_str!("../fixtures/rsa_private_a.pem");

/// PKIX public half of [`PRIVATE_KEY_PEM`].
pub const PUBLIC_KEY_PEM: &str = include_str!("../fixtures/rsa_public_a.pem");

/// An unrelated RSA key pair, for wrong-key and mismatch tests.
pub const SECONDARY_PRIVATE_KEY_PEM: &str = include_str!("../fixtures/rsa_private_b.pem");
pub const SECONDARY_PUBLIC_KEY_PEM: &str = include_str!("../fixtures/rsa_public_b.pem");

/// [`PRIVATE_KEY_PEM`] re-encoded as PKCS#8 (`PRIVATE KEY`).
pub const PRIVATE_KEY_PKCS8_PEM: &str = include_str!("../fixtures/rsa_private_a_pkcs8.pem");

/// P-256 keys; valid PEM but the wrong key type.
pub const EC_PRIVATE_KEY_PEM: &str = include_str!("../fixtures/ec_private.pem");
pub const EC_PUBLIC_KEY_PEM: &str = include_str!("../fixtures/ec_public.pem");

/// Key files written to a temporary directory, removed on drop.
pub struct TestKeyFiles {
    _dir: TempDir,
    pub private_key_path: PathBuf,
    pub public_key_path: PathBuf,
}

impl TestKeyFiles {
    /// Write the primary fixture pair.
    pub fn new() -> Self {
        Self::with_contents(PRIVATE_KEY_PEM, PUBLIC_KEY_PEM)
    }

    /// Write arbitrary contents as the private and public key files.
    pub fn with_contents(private_key: &str, public_key: &str) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir for key files");
        let private_key_path = dir.path().join("private_key.pem");
        let public_key_path = dir.path().join("public_key.pem");

        std::fs::write(&private_key_path, private_key).expect("write private key file");
        std::fs::write(&public_key_path, public_key).expect("write public key file");

        Self {
            _dir: dir,
            private_key_path,
            public_key_path,
        }
    }
}

impl Default for TestKeyFiles {
    fn default() -> Self {
        Self::new()
    }
}
