//! Metrics definitions.
//!
//! All metrics follow Prometheus naming conventions:
//! - `auth_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded:
//! - `status`: `success`, `error`
//! - `error_category`: the values of `AuthError::category()` plus `none`
//! - `outcome`: fixed per metric, see each function

use metrics::{counter, histogram};
use std::time::Duration;

// ============================================================================
// Token Metrics
// ============================================================================

/// Record token issuance duration and outcome
///
/// Metric: `auth_token_issuance_duration_seconds`, `auth_token_issuance_total`
/// Labels: `status`
pub fn record_token_issuance(status: &str, duration: Duration) {
    histogram!("auth_token_issuance_duration_seconds", "status" => status.to_string())
        .record(duration.as_secs_f64());

    counter!("auth_token_issuance_total", "status" => status.to_string()).increment(1);
}

/// Record token validation result
///
/// Metric: `auth_token_validations_total`
/// Labels: `status`, `error_category`
pub fn record_token_validation(status: &str, error_category: Option<&str>) {
    let category = error_category.unwrap_or("none");
    counter!("auth_token_validations_total", "status" => status.to_string(), "error_category" => category.to_string())
        .increment(1);
}

// ============================================================================
// Revocation Metrics
// ============================================================================

/// Metric: `auth_revocations_total`
/// Labels: `status`
pub fn record_revocation(status: &str) {
    counter!("auth_revocations_total", "status" => status.to_string()).increment(1);
}

/// Metric: `auth_revocation_checks_total`
/// Labels: `outcome` (`revoked`, `not_revoked`, `unavailable`)
pub fn record_revocation_check(outcome: &str) {
    counter!("auth_revocation_checks_total", "outcome" => outcome.to_string()).increment(1);
}

// ============================================================================
// Authentication Metrics
// ============================================================================

/// Metric: `auth_authentications_total`
/// Labels: `outcome` (`success`, `invalid_credentials`, `error`)
pub fn record_authentication(outcome: &str) {
    counter!("auth_authentications_total", "outcome" => outcome.to_string()).increment(1);
}
