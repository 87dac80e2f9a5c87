//! Error types for license validation.

use chrono::{DateTime, Utc};
use lcp_documents::ParseError;
use thiserror::Error;

/// Result type for validation operations.
pub type LcpResult<T> = Result<T, LcpError>;

/// Fatal validation errors.
///
/// Whether a given error actually terminates a validation depends on where
/// it is raised: Status Document fetch and parse failures are degraded by
/// the state machine, while the same `Network` error during the CRL fetch is
/// fatal. All variants are `Clone` so one terminal outcome can be delivered
/// to every subscribed observer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LcpError {
    /// The license's encryption profile is not accepted by this build.
    #[error("license encryption profile is not supported by this build")]
    LicenseProfileNotSupported,

    /// An HTTP exchange failed or returned a non-success status.
    #[error("network error: {0}")]
    Network(String),

    /// The License Document could not be parsed.
    #[error("malformed license document: {0}")]
    LicenseParsing(ParseError),

    /// The Status Document could not be parsed.
    #[error("malformed status document: {0}")]
    StatusParsing(ParseError),

    /// The native crypto layer rejected the license or the passphrase.
    #[error("license integrity check failed: {0}")]
    Integrity(String),

    /// The local license repository failed. Always logged and swallowed.
    #[error("license repository error: {0}")]
    Repository(String),
}

/// Non-fatal lifecycle errors.
///
/// A license can be well-formed and authentic yet not usable. These are
/// surfaced inside `ValidatedDocuments` rather than failing the validation,
/// so callers keep access to the license metadata for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StatusError {
    /// The current date is outside the license's rights window.
    #[error("license rights are only valid between {start} and {end}")]
    Expired {
        /// Effective start of the rights window.
        start: DateTime<Utc>,
        /// Effective end of the rights window.
        end: DateTime<Utc>,
    },

    /// The loan was returned.
    #[error("license was returned on {0}")]
    Returned(DateTime<Utc>),

    /// The provider revoked the license.
    #[error("license was revoked on {date} ({devices} device(s) registered)")]
    Revoked {
        /// When the revocation was recorded.
        date: DateTime<Utc>,
        /// Number of devices registered at revocation time.
        devices: usize,
    },

    /// The provider cancelled the license.
    #[error("license was cancelled on {0}")]
    Cancelled(DateTime<Utc>),
}
