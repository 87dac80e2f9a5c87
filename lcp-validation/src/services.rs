//! Contracts for the external collaborators of the validation machine.
//!
//! The core owns none of these concerns: HTTP, revocation lists, passphrase
//! storage and prompting, device identity, local persistence, and the native
//! crypto primitive are all injected. Implementations shared across machines
//! (CRL cache, passphrase store, repository) must be internally
//! synchronized; the core treats them as opaque.

use crate::documents::DrmContext;
use crate::error::LcpResult;
use async_trait::async_trait;
use lcp_documents::{LicenseDocument, Link};

/// Single-shot HTTP GET.
///
/// No retry or timeout policy is imposed here; implementations own both.
#[async_trait]
pub trait NetworkFetcher: Send + Sync {
    /// Fetches the resource at `url`.
    ///
    /// # Errors
    ///
    /// Any non-success response or transport failure surfaces as
    /// [`LcpError::Network`](crate::LcpError::Network).
    async fn fetch(&self, url: &str) -> LcpResult<Vec<u8>>;
}

/// Provider of the current Certificate Revocation List.
///
/// Implementations cache internally; the core fetches once per integrity
/// check.
#[async_trait]
pub trait CrlService: Send + Sync {
    /// Returns the current CRL bytes.
    async fn retrieve(&self) -> LcpResult<Vec<u8>>;
}

/// Interactive passphrase prompt surface.
///
/// Implemented by the embedding application; invoked when no stored
/// passphrase matches the license.
#[async_trait]
pub trait LcpAuthenticating: Send + Sync {
    /// Prompts the user for the license's passphrase.
    ///
    /// The license gives access to the provider's text hint. `None` means
    /// the user declined.
    async fn request_passphrase(&self, license: &LicenseDocument) -> Option<String>;
}

/// Resolves the passphrase for a license.
///
/// Consults the local passphrase store first, then falls back to the
/// authenticator when one is supplied. Infallible: implementation errors
/// are converted to `None` (cancellation).
#[async_trait]
pub trait PassphraseService: Send + Sync {
    /// Returns the passphrase, or `None` when the user cancelled.
    async fn request(
        &self,
        license: &LicenseDocument,
        authenticator: Option<&dyn LcpAuthenticating>,
    ) -> Option<String>;
}

/// Device identity and LSD registration.
#[async_trait]
pub trait DeviceService: Send + Sync {
    /// Registers this device against the Status Document's `register` link.
    ///
    /// Returns fresh Status Document bytes when the server replied with
    /// them. MUST return `Ok(None)` when this device is already registered
    /// for the license: the validation machine re-validates any returned
    /// status bytes, and the already-registered answer is what terminates
    /// that loop.
    async fn register_license(
        &self,
        license: &LicenseDocument,
        link: &Link,
    ) -> LcpResult<Option<Vec<u8>>>;
}

/// Local persistence of validated licenses.
#[async_trait]
pub trait LicenseRepository: Send + Sync {
    /// Records the license. Idempotent; the caller logs and swallows
    /// errors, so failures never affect the validation outcome.
    async fn add_license(&self, license: &LicenseDocument) -> LcpResult<()>;
}

/// The native cryptographic primitive.
#[async_trait]
pub trait DrmEngine: Send + Sync {
    /// Returns the first candidate passphrase the license accepts, if any.
    ///
    /// Also used once at startup, against an embedded probe license, to
    /// detect whether this is a production crypto build.
    async fn find_one_valid_passphrase(
        &self,
        license_json: &str,
        candidates: &[String],
    ) -> Option<String>;

    /// Builds a decryption context from the license, the passphrase, and
    /// the current CRL.
    ///
    /// # Errors
    ///
    /// Fails with [`LcpError::Integrity`](crate::LcpError::Integrity) on an
    /// invalid passphrase, a revoked certificate, or a broken signature.
    async fn create_context(
        &self,
        license_json: &str,
        passphrase: &str,
        crl: &[u8],
    ) -> LcpResult<DrmContext>;
}
