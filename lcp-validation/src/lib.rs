//! License validation core for Readium LCP.
//!
//! Given a raw License Document extracted from a protected publication,
//! this crate produces either a usable decryption context or a precise
//! reason the license cannot be honored. The flow is an event-driven state
//! machine coordinating:
//! - parsing and schema checks on the License and Status Documents;
//! - the dialogue with the provider's LSD server (status fetch, license
//!   re-download, device registration);
//! - the revocation-list fetch;
//! - the interactive passphrase prompt;
//! - the native cryptographic integrity check;
//! - best-effort local persistence of the latest license bytes.
//!
//! Status Document failures degrade rather than fail, since a valid
//! offline license must stay readable. Lifecycle errors (expired, returned,
//! revoked, cancelled) terminate in a *successful* validation carrying the
//! error, so callers keep access to the license metadata.
//!
//! All collaborators are injected through service traits;
//! [`HttpFetcher`] is the one implementation shipped here.

mod documents;
mod error;
mod http;
mod machine;
mod observers;
mod profiles;
mod services;
mod validation;

pub use documents::{Context, DrmContext, ValidatedDocuments};
pub use error::{LcpError, LcpResult, StatusError};
pub use http::{HttpFetcher, HttpFetcherConfig};
pub use machine::{Event, State};
pub use observers::{Observer, Policy};
pub use profiles::{supported_profiles, BASIC_PROFILE, PROFILE_1_0};
pub use services::{
    CrlService, DeviceService, DrmEngine, LcpAuthenticating, LicenseRepository, NetworkFetcher,
    PassphraseService,
};
pub use validation::{
    LicenseValidation, OnLicenseValidated, ValidationDocument, ValidationServices,
};
