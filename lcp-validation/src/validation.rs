//! The validation facade and its step handlers.
//!
//! [`LicenseValidation`] owns one state machine, its observer list, and the
//! injected service handles. Events are processed by a single dispatch
//! loop: applying an event moves the machine to a new state, the new
//! state's handler runs, and the event it returns is delivered on the next
//! loop turn, so handlers never observe a transition they caused. Handler
//! errors are converted to `Failed` events at the dispatch point; the table
//! decides which of those are fatal.

use crate::documents::ValidatedDocuments;
use crate::error::{LcpError, LcpResult, StatusError};
use crate::machine::{Event, State};
use crate::observers::{Observer, ObserverRegistry, Policy};
use crate::profiles::{supported_profiles, BASIC_PROFILE, PROBE_LICENSE, PROBE_PASSPHRASE};
use crate::services::{
    CrlService, DeviceService, DrmEngine, LcpAuthenticating, LicenseRepository, NetworkFetcher,
    PassphraseService,
};
use chrono::Utc;
use lcp_documents::{rel, EventType, LicenseDocument, Link, Status, StatusDocument};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Seed document handed to [`LicenseValidation::validate`].
#[derive(Debug, Clone)]
pub enum ValidationDocument {
    /// Raw License Document bytes, as read from the publication.
    License(Vec<u8>),
    /// Raw Status Document bytes, e.g. from a local cache.
    Status(Vec<u8>),
}

/// Hook invoked exactly once per freshly parsed License Document, including
/// after a re-fetch. Callers use it to write updated license bytes back
/// into the originating container.
pub type OnLicenseValidated = Box<dyn Fn(&LicenseDocument) + Send + Sync>;

/// The injected collaborators of one validation machine.
///
/// The CRL cache, passphrase store, and repository are typically
/// process-wide; handles are cheap to clone into each machine.
pub struct ValidationServices {
    /// HTTP GET used for the status and license fetches.
    pub network: Arc<dyn NetworkFetcher>,
    /// Certificate Revocation List provider.
    pub crl: Arc<dyn CrlService>,
    /// Passphrase store and prompt driver.
    pub passphrases: Arc<dyn PassphraseService>,
    /// Device identity and LSD registration.
    pub device: Arc<dyn DeviceService>,
    /// Local license persistence.
    pub repository: Arc<dyn LicenseRepository>,
    /// Native cryptographic primitive.
    pub drm: Arc<dyn DrmEngine>,
}

/// Validates one license. Construct one instance per license; the machine
/// is single-threaded by design (`&mut self` everywhere) and a caller that
/// wants parallel validations runs one instance each.
pub struct LicenseValidation {
    services: ValidationServices,
    authenticator: Option<Arc<dyn LcpAuthenticating>>,
    on_license_validated: OnLicenseValidated,
    production: bool,
    state: State,
    observers: ObserverRegistry,
}

impl LicenseValidation {
    /// Creates a validation machine.
    ///
    /// Probes the DRM engine with the embedded production license: only a
    /// production crypto build can validate it, and non-production builds
    /// are restricted to the basic encryption profile.
    pub async fn new(
        services: ValidationServices,
        authenticator: Option<Arc<dyn LcpAuthenticating>>,
        on_license_validated: OnLicenseValidated,
    ) -> Self {
        let production = detect_production(&*services.drm).await;
        debug!(production, "license validation created");
        Self {
            services,
            authenticator,
            on_license_validated,
            production,
            state: State::Start,
            observers: ObserverRegistry::new(),
        }
    }

    /// Whether the DRM engine is a production build.
    #[must_use]
    pub fn is_production(&self) -> bool {
        self.production
    }

    /// Current machine state.
    #[must_use]
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Validates a seed document, reporting the outcome to `observer`.
    ///
    /// The observer is enrolled with `Once` policy and fires at the next
    /// terminal notification (immediately, when the machine is already
    /// terminal). A `Status` seed only has effect on an already-valid
    /// machine (Status Document refresh); elsewhere the transition table
    /// ignores it.
    pub async fn validate(&mut self, document: ValidationDocument, observer: Observer) {
        self.subscribe(observer, Policy::Once);
        let event = match document {
            ValidationDocument::License(data) => Event::RetrievedLicenseData(data),
            ValidationDocument::Status(data) => Event::RetrievedStatusData(data),
        };
        self.process(event).await;
    }

    /// Enrolls a long-lived watcher.
    ///
    /// When the machine is already terminal the observer is invoked
    /// synchronously; a `Once` observer is then not enrolled at all.
    pub fn subscribe(&mut self, mut observer: Observer, policy: Policy) {
        match &self.state {
            State::Valid { documents } => {
                observer(Some(documents.clone()), None);
                if policy == Policy::Always {
                    self.observers.add(observer, policy);
                }
            }
            State::Failure { error } => {
                observer(None, Some(error.clone()));
                if policy == Policy::Always {
                    self.observers.add(observer, policy);
                }
            }
            _ => self.observers.add(observer, policy),
        }
    }

    /// Single dispatch point. Applies events FIFO; each handler's follow-up
    /// event is delivered only after the handler has returned.
    async fn process(&mut self, event: Event) {
        let mut next = Some(event);
        while let Some(event) = next.take() {
            let from = self.state.to_string();
            let name = event.to_string();
            let state = std::mem::replace(&mut self.state, State::Start);
            let (state, transitioned) = state.apply(event);
            self.state = state;
            if transitioned {
                debug!(%from, event = %name, to = %self.state, "transition");
                next = self.on_enter().await;
            } else {
                debug!(state = %from, event = %name, "event ignored");
            }
        }
    }

    /// Runs the entering state's handler and returns its follow-up event.
    /// Terminal states notify observers and return nothing; they never
    /// re-throw.
    async fn on_enter(&mut self) -> Option<Event> {
        match self.state.clone() {
            // Only re-entered through passphrase cancellation: tell the
            // observers nothing is wrong but nothing is validated either.
            State::Start => {
                self.observers.notify(None, None);
                None
            }
            State::ValidateLicense { data, .. } => {
                Some(self.validate_license(&data).await.unwrap_or_else(Event::Failed))
            }
            State::FetchStatus { license } => {
                Some(self.fetch_status(&license).await.unwrap_or_else(Event::Failed))
            }
            State::ValidateStatus { data, .. } => {
                Some(validate_status(&data).unwrap_or_else(Event::Failed))
            }
            State::FetchLicense { status, .. } => {
                Some(self.fetch_license(&status).await.unwrap_or_else(Event::Failed))
            }
            State::CheckLicenseStatus { license, status } => {
                Some(check_license_status(&license, status.as_ref()))
            }
            State::RequestPassphrase { license, .. } => {
                Some(self.request_passphrase(&license).await)
            }
            State::ValidateIntegrity {
                license, passphrase, ..
            } => Some(
                self.validate_integrity(&license, &passphrase)
                    .await
                    .unwrap_or_else(Event::Failed),
            ),
            State::RegisterDevice { documents, link } => Some(
                self.register_device(&documents, &link)
                    .await
                    .unwrap_or_else(Event::Failed),
            ),
            State::Valid { documents } => {
                info!(license = documents.license().id(), "license validated");
                self.observers.notify(Some(documents), None);
                None
            }
            State::Failure { error } => {
                info!(%error, "license validation failed");
                self.observers.notify(None, Some(error));
                None
            }
        }
    }

    // ── Step handlers ───────────────────────────────────────────

    async fn validate_license(&self, data: &[u8]) -> LcpResult<Event> {
        let license = LicenseDocument::from_bytes(data).map_err(LcpError::LicenseParsing)?;
        if !self.production && license.profile() != BASIC_PROFILE {
            return Err(LcpError::LicenseProfileNotSupported);
        }
        (self.on_license_validated)(&license);
        // Persistence is best-effort: a repository failure must never fail
        // the validation.
        if let Err(error) = self.services.repository.add_license(&license).await {
            warn!(%error, license = license.id(), "could not persist license");
        }
        Ok(Event::ValidatedLicense(license))
    }

    async fn fetch_status(&self, license: &LicenseDocument) -> LcpResult<Event> {
        let link = license
            .link(rel::STATUS)
            .ok_or_else(|| LcpError::Network("license has no status link".to_string()))?;
        let data = self.services.network.fetch(&link.href).await?;
        Ok(Event::RetrievedStatusData(data))
    }

    async fn fetch_license(&self, status: &StatusDocument) -> LcpResult<Event> {
        let link = status
            .link(rel::LICENSE)
            .ok_or_else(|| LcpError::Network("status document has no license link".to_string()))?;
        let data = self.services.network.fetch(&link.href).await?;
        Ok(Event::RetrievedLicenseData(data))
    }

    async fn request_passphrase(&self, license: &LicenseDocument) -> Event {
        let authenticator = self.authenticator.as_deref();
        match self
            .services
            .passphrases
            .request(license, authenticator)
            .await
        {
            Some(passphrase) => Event::RetrievedPassphrase(passphrase),
            None => Event::Cancelled,
        }
    }

    async fn validate_integrity(
        &self,
        license: &LicenseDocument,
        passphrase: &str,
    ) -> LcpResult<Event> {
        // The profile gate runs again here: the license may have been
        // re-fetched since it was first validated.
        if !supported_profiles(self.production).contains(&license.profile()) {
            return Err(LcpError::LicenseProfileNotSupported);
        }
        let crl = self.services.crl.retrieve().await?;
        let context = self
            .services
            .drm
            .create_context(license.raw_str(), passphrase, &crl)
            .await?;
        Ok(Event::ValidatedIntegrity(context))
    }

    async fn register_device(
        &self,
        documents: &ValidatedDocuments,
        link: &Link,
    ) -> LcpResult<Event> {
        // Registration is best-effort: the table degrades the failure to
        // Valid, so this is the only place the error is surfaced.
        match self
            .services
            .device
            .register_license(documents.license(), link)
            .await
        {
            Ok(data) => Ok(Event::RegisteredDevice(data)),
            Err(error) => {
                warn!(%error, license = documents.license().id(), "could not register device");
                Err(error)
            }
        }
    }
}

/// Probes the DRM engine with the embedded production license and its known
/// passphrase. Acceptance means the engine holds production key material.
async fn detect_production(drm: &dyn DrmEngine) -> bool {
    let candidates = [PROBE_PASSPHRASE.to_string()];
    drm.find_one_valid_passphrase(PROBE_LICENSE, &candidates)
        .await
        .as_deref()
        == Some(PROBE_PASSPHRASE)
}

fn validate_status(data: &[u8]) -> LcpResult<Event> {
    let status = StatusDocument::from_bytes(data).map_err(LcpError::StatusParsing)?;
    Ok(Event::ValidatedStatus(status))
}

/// Evaluates the rights window, deriving the lifecycle error from the
/// Status Document when the window is closed.
fn check_license_status(license: &LicenseDocument, status: Option<&StatusDocument>) -> Event {
    let now = Utc::now();
    let start = license.rights().start.unwrap_or(now);
    let end = license.rights().end.unwrap_or(now);

    if start <= now && now <= end {
        return Event::CheckedLicenseStatus(None);
    }

    let error = match status {
        Some(status) => match status.status() {
            // The provider has not recorded a lifecycle change yet; the
            // window itself is the reason.
            Status::Ready | Status::Active | Status::Expired => {
                StatusError::Expired { start, end }
            }
            Status::Returned => StatusError::Returned(status.status_updated()),
            Status::Revoked => StatusError::Revoked {
                date: status.status_updated(),
                devices: status.events_with_type(EventType::Register).count(),
            },
            Status::Cancelled => StatusError::Cancelled(status.status_updated()),
        },
        None => StatusError::Expired { start, end },
    };
    Event::CheckedLicenseStatus(Some(error))
}
