//! The validation state machine.
//!
//! States and events are tagged unions; [`State::apply`] is the single,
//! pure transition function. All I/O lives in the step handlers driven by
//! the facade, so applying an event never suspends and never fails.
//!
//! The table encodes the degradation policy: Status Document failures fall
//! back to what is already known, a lifecycle error still terminates in
//! `Valid` (with the error captured in the documents), and device
//! registration can never deny access.

use crate::documents::{Context, DrmContext, ValidatedDocuments};
use crate::error::{LcpError, StatusError};
use lcp_documents::{rel, LicenseDocument, Link, StatusDocument};
use std::fmt;
use std::sync::Arc;

/// A validation machine state. States own the documents relevant to them.
#[derive(Debug, Clone)]
pub enum State {
    /// Awaiting a seed document.
    Start,
    /// Parsing raw License Document bytes and enforcing the profile policy.
    ValidateLicense {
        /// Raw License Document bytes.
        data: Vec<u8>,
        /// Status Document carried over from a previous round, if any.
        status: Option<StatusDocument>,
    },
    /// Retrieving the Status Document from the LSD server.
    FetchStatus {
        /// The validated license.
        license: LicenseDocument,
    },
    /// Parsing raw Status Document bytes.
    ValidateStatus {
        /// The validated license.
        license: LicenseDocument,
        /// Raw Status Document bytes.
        data: Vec<u8>,
    },
    /// The Status Document advertised a newer license; re-downloading it.
    FetchLicense {
        /// The stale license.
        license: LicenseDocument,
        /// The Status Document that advertised the update.
        status: StatusDocument,
    },
    /// Evaluating the rights window and the lifecycle status.
    CheckLicenseStatus {
        /// The validated license.
        license: LicenseDocument,
        /// The Status Document, when one was obtained.
        status: Option<StatusDocument>,
    },
    /// Waiting on the user's passphrase.
    RequestPassphrase {
        /// The validated license.
        license: LicenseDocument,
        /// The Status Document, when one was obtained.
        status: Option<StatusDocument>,
    },
    /// Running the native integrity check.
    ValidateIntegrity {
        /// The validated license.
        license: LicenseDocument,
        /// The Status Document, when one was obtained.
        status: Option<StatusDocument>,
        /// The accepted passphrase.
        passphrase: String,
    },
    /// Best-effort device activation.
    RegisterDevice {
        /// The complete validation outcome so far.
        documents: ValidatedDocuments,
        /// The `register` link to call.
        link: Link,
    },
    /// Terminal success. Accepts `RetrievedStatusData` for SD refresh.
    Valid {
        /// The validation outcome handed to observers.
        documents: Arc<ValidatedDocuments>,
    },
    /// Terminal failure.
    Failure {
        /// The fatal error.
        error: LcpError,
    },
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            State::Start => "start",
            State::ValidateLicense { .. } => "validate_license",
            State::FetchStatus { .. } => "fetch_status",
            State::ValidateStatus { .. } => "validate_status",
            State::FetchLicense { .. } => "fetch_license",
            State::CheckLicenseStatus { .. } => "check_license_status",
            State::RequestPassphrase { .. } => "request_passphrase",
            State::ValidateIntegrity { .. } => "validate_integrity",
            State::RegisterDevice { .. } => "register_device",
            State::Valid { .. } => "valid",
            State::Failure { .. } => "failure",
        };
        f.write_str(name)
    }
}

/// An event raised by a step handler or injected by the facade.
#[derive(Debug)]
pub enum Event {
    /// Raw License Document bytes are available.
    RetrievedLicenseData(Vec<u8>),
    /// The License Document parsed and passed the profile policy.
    ValidatedLicense(LicenseDocument),
    /// Raw Status Document bytes are available.
    RetrievedStatusData(Vec<u8>),
    /// The Status Document parsed.
    ValidatedStatus(StatusDocument),
    /// The rights window and lifecycle were evaluated; `None` means usable.
    CheckedLicenseStatus(Option<StatusError>),
    /// The user supplied a passphrase.
    RetrievedPassphrase(String),
    /// The native crypto layer produced a context.
    ValidatedIntegrity(DrmContext),
    /// Device registration finished, possibly with fresh status bytes.
    RegisteredDevice(Option<Vec<u8>>),
    /// A step failed.
    Failed(LcpError),
    /// The user declined the passphrase prompt.
    Cancelled,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Event::RetrievedLicenseData(_) => "retrieved_license_data",
            Event::ValidatedLicense(_) => "validated_license",
            Event::RetrievedStatusData(_) => "retrieved_status_data",
            Event::ValidatedStatus(_) => "validated_status",
            Event::CheckedLicenseStatus(_) => "checked_license_status",
            Event::RetrievedPassphrase(_) => "retrieved_passphrase",
            Event::ValidatedIntegrity(_) => "validated_integrity",
            Event::RegisteredDevice(_) => "registered_device",
            Event::Failed(_) => "failed",
            Event::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

impl State {
    /// Applies an event, returning the next state and whether a transition
    /// happened. Undefined (state, event) pairs return the state unchanged.
    #[must_use]
    pub fn apply(self, event: Event) -> (State, bool) {
        use Event as E;
        use State as S;

        let next = match (self, event) {
            (S::Start, E::RetrievedLicenseData(data)) => S::ValidateLicense { data, status: None },

            (S::ValidateLicense { status, .. }, E::ValidatedLicense(license)) => match status {
                Some(status) => S::CheckLicenseStatus {
                    license,
                    status: Some(status),
                },
                None => S::FetchStatus { license },
            },
            (S::ValidateLicense { .. }, E::Failed(error)) => S::Failure { error },

            (S::FetchStatus { license }, E::RetrievedStatusData(data)) => {
                S::ValidateStatus { license, data }
            }
            // The Status Document is optional: a fetch failure degrades to
            // validating the license on its own.
            (S::FetchStatus { license }, E::Failed(_)) => S::CheckLicenseStatus {
                license,
                status: None,
            },

            (S::ValidateStatus { license, .. }, E::ValidatedStatus(status)) => {
                if license.updated() < status.license_updated() {
                    S::FetchLicense { license, status }
                } else {
                    S::CheckLicenseStatus {
                        license,
                        status: Some(status),
                    }
                }
            }
            (S::ValidateStatus { license, .. }, E::Failed(_)) => S::CheckLicenseStatus {
                license,
                status: None,
            },

            (S::FetchLicense { status, .. }, E::RetrievedLicenseData(data)) => {
                // Carry the Status Document forward so it is not re-fetched.
                S::ValidateLicense {
                    data,
                    status: Some(status),
                }
            }
            (S::FetchLicense { license, status }, E::Failed(_)) => S::CheckLicenseStatus {
                license,
                status: Some(status),
            },

            (S::CheckLicenseStatus { license, status }, E::CheckedLicenseStatus(error)) => {
                match error {
                    // A lifecycle error is not fatal: surface it inside the
                    // validated documents so callers keep the metadata.
                    Some(error) => S::Valid {
                        documents: Arc::new(ValidatedDocuments::new(
                            license,
                            Context::Error(error),
                            status,
                        )),
                    },
                    None => S::RequestPassphrase { license, status },
                }
            }

            (S::RequestPassphrase { license, status }, E::RetrievedPassphrase(passphrase)) => {
                S::ValidateIntegrity {
                    license,
                    status,
                    passphrase,
                }
            }
            // Cancellation returns to the start so the caller can retry
            // with another authenticator on the same machine.
            (S::RequestPassphrase { .. }, E::Cancelled) => S::Start,
            (S::RequestPassphrase { .. }, E::Failed(error)) => S::Failure { error },

            (S::ValidateIntegrity { license, status, .. }, E::ValidatedIntegrity(context)) => {
                let link = status
                    .as_ref()
                    .and_then(|s| s.link(rel::REGISTER))
                    .cloned();
                let documents = ValidatedDocuments::new(license, Context::Drm(context), status);
                match link {
                    Some(link) => S::RegisterDevice { documents, link },
                    None => S::Valid {
                        documents: Arc::new(documents),
                    },
                }
            }
            (S::ValidateIntegrity { .. }, E::Failed(error)) => S::Failure { error },

            (S::RegisterDevice { documents, .. }, E::RegisteredDevice(Some(data))) => {
                // The server answered with fresh status bytes: re-validate
                // them. The device service reports "already registered" as
                // no data, which is what ends this loop.
                S::ValidateStatus {
                    license: documents.license().clone(),
                    data,
                }
            }
            (S::RegisterDevice { documents, .. }, E::RegisteredDevice(None)) => S::Valid {
                documents: Arc::new(documents),
            },
            // Registration is best-effort and never denies access.
            (S::RegisterDevice { documents, .. }, E::Failed(_)) => S::Valid {
                documents: Arc::new(documents),
            },

            // SD refresh extension point: nothing injects this today except
            // a `Status` seed on an already-valid machine.
            (S::Valid { documents }, E::RetrievedStatusData(data)) => S::ValidateStatus {
                license: documents.license().clone(),
                data,
            },

            (state, _) => return (state, false),
        };
        (next, true)
    }
}
