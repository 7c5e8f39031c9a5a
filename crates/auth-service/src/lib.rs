//! Token Authentication Service Library
//!
//! Issues, verifies and revokes RS512-signed bearer tokens for a backend
//! service.
//!
//! # Modules
//!
//! - `config` - Service configuration
//! - `crypto` - Claims, key loading and password verification
//! - `errors` - Error types
//! - `models` - Request/response data models
//! - `observability` - Tracing setup and metrics
//! - `redis` - Redis-backed revocation cache
//! - `repositories` - Credential lookup capability
//! - `services` - Token issuer, validator, revocation store and the
//!   authentication backend that composes them
//!
//! # Usage
//!
//! ```rust,ignore
//! let config = Config::from_env()?;
//! let cache = Arc::new(RedisRevocationCache::new(config.redis_url.expose_secret()).await?);
//! let backend = AuthenticationBackend::initialize(&config, cache, credential_store)?;
//!
//! let token = backend.issue_token("user-123")?;
//! let claims = backend.validate(&token).await?;
//! backend.logout(&token, &claims).await?;
//! ```

pub mod config;
pub mod crypto;
pub mod errors;
pub mod models;
pub mod observability;
pub mod redis;
pub mod repositories;
pub mod services;

pub use config::Config;
pub use crypto::keys::KeyStore;
pub use crypto::Claims;
pub use errors::AuthError;
pub use redis::RedisRevocationCache;
pub use repositories::credentials::{CredentialStore, StoredCredential};
pub use services::auth_backend::{AuthenticationBackend, BackendSettings};
pub use services::revocation::{RevocationCache, RevocationFailurePolicy, RevocationStore};
pub use services::token_issuer::TokenIssuer;
pub use services::token_validator::TokenValidator;
