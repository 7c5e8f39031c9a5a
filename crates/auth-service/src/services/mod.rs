pub mod auth_backend;
pub mod revocation;
pub mod token_issuer;
pub mod token_validator;
