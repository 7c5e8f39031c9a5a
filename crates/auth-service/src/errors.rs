use thiserror::Error;

/// Generic message for every token rejection.
///
/// Callers may surface this to clients; the specific reason is only logged.
pub const INVALID_TOKEN_MESSAGE: &str = "The access token is invalid or expired";

#[derive(Debug, Error)]
pub enum AuthError {
    /// Key file missing, unreadable, not PEM, or not the expected key type.
    /// Only raised during initialization.
    #[error("Key load failure: {0}")]
    KeyLoadFailure(String),

    #[error("Token signing failed: {0}")]
    SigningFailure(String),

    #[error("{}", INVALID_TOKEN_MESSAGE)]
    MalformedToken,

    /// Header declares an algorithm other than the one this service issues.
    #[error("{}", INVALID_TOKEN_MESSAGE)]
    AlgorithmMismatch,

    #[error("{}", INVALID_TOKEN_MESSAGE)]
    InvalidSignature,

    #[error("{}", INVALID_TOKEN_MESSAGE)]
    TokenExpired,

    /// `iat` lies further in the future than the configured clock skew.
    #[error("{}", INVALID_TOKEN_MESSAGE)]
    TokenNotYetValid,

    #[error("{}", INVALID_TOKEN_MESSAGE)]
    TokenRevoked,

    /// Revocation lookup or write failed or timed out. The revocation state
    /// of the token is unknown.
    #[error("Revocation store unavailable: {0}")]
    RevocationStoreUnavailable(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Credential store unavailable: {0}")]
    CredentialStoreUnavailable(String),

    #[error("Cryptographic error: {0}")]
    Crypto(String),

    #[error("Internal error")]
    Internal,
}

impl AuthError {
    /// Bounded label used for metrics.
    pub fn category(&self) -> &'static str {
        match self {
            AuthError::KeyLoadFailure(_) | AuthError::SigningFailure(_) | AuthError::Crypto(_) => {
                "cryptographic"
            }
            AuthError::MalformedToken
            | AuthError::AlgorithmMismatch
            | AuthError::InvalidSignature
            | AuthError::TokenNotYetValid => "invalid_token",
            AuthError::TokenExpired => "expired",
            AuthError::TokenRevoked => "revoked",
            AuthError::InvalidCredentials => "authentication",
            AuthError::RevocationStoreUnavailable(_)
            | AuthError::CredentialStoreUnavailable(_) => "unavailable",
            AuthError::Internal => "internal",
        }
    }

    /// True for rejections of the presented token itself, as opposed to
    /// infrastructure failures.
    pub fn is_token_rejection(&self) -> bool {
        matches!(
            self,
            AuthError::MalformedToken
                | AuthError::AlgorithmMismatch
                | AuthError::InvalidSignature
                | AuthError::TokenExpired
                | AuthError::TokenNotYetValid
                | AuthError::TokenRevoked
        )
    }
}
