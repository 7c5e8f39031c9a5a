//! Signing key loading.
//!
//! Keys are read once at startup from PEM files: the private key as a PKCS#1
//! `RSA PRIVATE KEY` block, the public key as a PKIX `PUBLIC KEY` block. The
//! resulting [`KeyStore`] is immutable and is shared by reference (or `Arc`)
//! across every request; reads need no locking.
//!
//! Error messages name the file and the failure but never include key
//! material.

use crate::crypto::TOKEN_ALGORITHM;
use crate::errors::AuthError;
use base64::{engine::general_purpose, Engine as _};
use jsonwebtoken::{DecodingKey, EncodingKey};
use ring::signature::RsaKeyPair;
use std::fmt;
use std::path::Path;
use tracing::{debug, info, instrument};

const PRIVATE_KEY_PEM_LABEL: &str = "RSA PRIVATE KEY";
const PUBLIC_KEY_PEM_LABEL: &str = "PUBLIC KEY";

/// Signed and verified at load time to prove the two keys belong together.
const KEY_PAIR_PROBE: &[u8] = b"key-pair-consistency-probe";

/// The service's signing key pair.
///
/// The private half never leaves this struct; Debug output is redacted.
pub struct KeyStore {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl fmt::Debug for KeyStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyStore")
            .field("encoding_key", &"[REDACTED]")
            .field("decoding_key", &"[REDACTED]")
            .finish()
    }
}

impl KeyStore {
    /// Load and cross-check both keys from disk.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::KeyLoadFailure` if either file is missing or
    /// unreadable, is not the expected PEM block, does not decode to an RSA
    /// key, or if the public key does not match the private key.
    #[instrument(skip_all)]
    pub fn load(
        private_key_path: impl AsRef<Path>,
        public_key_path: impl AsRef<Path>,
    ) -> Result<Self, AuthError> {
        let encoding_key = load_private_key(private_key_path)?;
        let decoding_key = load_public_key(public_key_path)?;

        verify_key_pair(&encoding_key, &decoding_key)?;

        info!(target: "auth.keys", "Signing key pair loaded");

        Ok(Self {
            encoding_key,
            decoding_key,
        })
    }

    /// Build a key store from PEM text already in memory.
    pub fn from_pem(private_key_pem: &str, public_key_pem: &str) -> Result<Self, AuthError> {
        let encoding_key = parse_private_key_pem(private_key_pem, "private key")?;
        let decoding_key = parse_public_key_pem(public_key_pem, "public key")?;

        verify_key_pair(&encoding_key, &decoding_key)?;

        Ok(Self {
            encoding_key,
            decoding_key,
        })
    }

    pub(crate) fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }
}

/// Load a PKCS#1 RSA private key from a PEM file.
#[instrument(skip_all)]
pub fn load_private_key(path: impl AsRef<Path>) -> Result<EncodingKey, AuthError> {
    let path = path.as_ref();
    let pem = read_key_file(path)?;
    parse_private_key_pem(&pem, &path.display().to_string())
}

/// Load a PKIX RSA public key from a PEM file.
#[instrument(skip_all)]
pub fn load_public_key(path: impl AsRef<Path>) -> Result<DecodingKey, AuthError> {
    let path = path.as_ref();
    let pem = read_key_file(path)?;
    parse_public_key_pem(&pem, &path.display().to_string())
}

/// Parse a PKCS#1 `RSA PRIVATE KEY` PEM block.
///
/// `source` names the origin of the PEM text in error messages.
pub fn parse_private_key_pem(pem: &str, source: &str) -> Result<EncodingKey, AuthError> {
    let der = decode_pem_block(pem, PRIVATE_KEY_PEM_LABEL, source)?;

    // ring rejects anything that is not a well-formed RSAPrivateKey (and
    // moduli under 2048 bits), so bad keys fail here instead of on first sign.
    RsaKeyPair::from_der(&der).map_err(|e| {
        AuthError::KeyLoadFailure(format!(
            "{}: not a valid PKCS#1 RSA private key: {}",
            source, e
        ))
    })?;

    Ok(EncodingKey::from_rsa_der(&der))
}

/// Parse a PKIX `PUBLIC KEY` PEM block holding an RSA key.
pub fn parse_public_key_pem(pem: &str, source: &str) -> Result<DecodingKey, AuthError> {
    decode_pem_block(pem, PUBLIC_KEY_PEM_LABEL, source)?;

    DecodingKey::from_rsa_pem(pem.as_bytes()).map_err(|e| {
        AuthError::KeyLoadFailure(format!("{}: not a valid RSA public key: {}", source, e))
    })
}

fn read_key_file(path: &Path) -> Result<String, AuthError> {
    std::fs::read_to_string(path).map_err(|e| {
        AuthError::KeyLoadFailure(format!("{}: cannot read key file: {}", path.display(), e))
    })
}

/// Extract and base64-decode the body of the first PEM block with `label`.
fn decode_pem_block(pem: &str, label: &str, source: &str) -> Result<Vec<u8>, AuthError> {
    let begin = format!("-----BEGIN {}-----", label);
    let end = format!("-----END {}-----", label);

    let mut lines = pem.lines().map(str::trim);
    if !lines.by_ref().any(|line| line == begin) {
        return Err(AuthError::KeyLoadFailure(format!(
            "{}: no '{}' PEM block found",
            source, label
        )));
    }

    let mut body = String::new();
    let mut terminated = false;
    for line in lines {
        if line == end {
            terminated = true;
            break;
        }
        body.push_str(line);
    }

    if !terminated || body.is_empty() {
        return Err(AuthError::KeyLoadFailure(format!(
            "{}: malformed '{}' PEM block",
            source, label
        )));
    }

    general_purpose::STANDARD.decode(&body).map_err(|e| {
        debug!(target: "auth.keys", error = %e, "PEM body is not valid base64");
        AuthError::KeyLoadFailure(format!("{}: PEM body is not valid base64", source))
    })
}

fn verify_key_pair(encoding_key: &EncodingKey, decoding_key: &DecodingKey) -> Result<(), AuthError> {
    let signature = jsonwebtoken::crypto::sign(KEY_PAIR_PROBE, encoding_key, TOKEN_ALGORITHM)
        .map_err(|e| {
            AuthError::KeyLoadFailure(format!("private key cannot sign: {}", e))
        })?;

    let matches =
        jsonwebtoken::crypto::verify(&signature, KEY_PAIR_PROBE, decoding_key, TOKEN_ALGORITHM)
            .map_err(|e| {
                AuthError::KeyLoadFailure(format!("public key cannot verify: {}", e))
            })?;

    if !matches {
        return Err(AuthError::KeyLoadFailure(
            "public key does not match private key".to_string(),
        ));
    }

    Ok(())
}
