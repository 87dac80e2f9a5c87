//! The outcome handed to observers when validation succeeds.

use crate::error::StatusError;
use lcp_documents::{LicenseDocument, StatusDocument};

/// Opaque DRM handle produced by the native crypto layer.
///
/// Required to decrypt publication resources. The fields are owned by the
/// crypto implementation; this crate never interprets them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrmContext {
    /// SHA-256 of the accepted passphrase, hex-encoded.
    pub hashed_passphrase: String,
    /// Base64 content key, still encrypted with the user key.
    pub encrypted_content_key: String,
    /// Opaque session token.
    pub token: String,
    /// Profile the context was created for.
    pub profile: String,
}

/// Either a usable decryption context or the reason the license is not
/// usable right now.
#[derive(Debug, Clone, PartialEq)]
pub enum Context {
    /// The license passed the integrity check and is inside its rights
    /// window.
    Drm(DrmContext),
    /// The license is well-formed but its lifecycle forbids use.
    Error(StatusError),
}

/// The final product of a successful validation run.
///
/// `status` is `None` when the Status Document could not be fetched or
/// parsed; an offline license is still readable. The value is handed to
/// observers behind an `Arc` and may outlive the state machine.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedDocuments {
    license: LicenseDocument,
    context: Context,
    status: Option<StatusDocument>,
}

impl ValidatedDocuments {
    /// Bundles a validation outcome.
    #[must_use]
    pub fn new(license: LicenseDocument, context: Context, status: Option<StatusDocument>) -> Self {
        Self {
            license,
            context,
            status,
        }
    }

    /// The validated License Document.
    #[must_use]
    pub fn license(&self) -> &LicenseDocument {
        &self.license
    }

    /// The Status Document, when one was obtained.
    #[must_use]
    pub fn status(&self) -> Option<&StatusDocument> {
        self.status.as_ref()
    }

    /// The decryption context.
    ///
    /// # Errors
    ///
    /// Returns the [`StatusError`] when the license is not usable. Callers
    /// that only need metadata must not call this.
    pub fn context(&self) -> Result<&DrmContext, StatusError> {
        match &self.context {
            Context::Drm(context) => Ok(context),
            Context::Error(error) => Err(*error),
        }
    }

    /// The lifecycle error, when the license is not usable.
    #[must_use]
    pub fn status_error(&self) -> Option<&StatusError> {
        match &self.context {
            Context::Drm(_) => None,
            Context::Error(error) => Some(error),
        }
    }
}
