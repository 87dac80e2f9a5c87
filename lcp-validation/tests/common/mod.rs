//! Shared fixtures and service mocks for validation tests.

#![allow(dead_code)]

use async_trait::async_trait;
use lcp_documents::{LicenseDocument, Link};
use lcp_validation::{
    CrlService, DeviceService, DrmContext, DrmEngine, LcpAuthenticating, LcpError,
    LicenseRepository, LicenseValidation, NetworkFetcher, Observer, PassphraseService,
    ValidatedDocuments, ValidationServices,
};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const STATUS_URL: &str = "https://lsd.example.org/status/df09ac25";
pub const LICENSE_URL: &str = "https://lsd.example.org/license/df09ac25";
pub const PASSPHRASE: &str = "correct horse battery staple";

// ── Document fixtures ───────────────────────────────────────────

/// A basic-profile license, rights window [2020, 2030], with a `status`
/// link pointing at [`STATUS_URL`].
pub fn license_json() -> Value {
    json!({
        "id": "df09ac25-a386-4c5c-b167-33ce4c36ca65",
        "issued": "2020-01-01T00:00:00Z",
        "provider": "https://provider.example.org",
        "encryption": {
            "profile": "http://readium.org/lcp/basic-profile",
            "content_key": {
                "algorithm": "http://www.w3.org/2001/04/xmlenc#aes256-cbc",
                "encrypted_value": "bRWLJzzcZJMFEELFLTqJxQTEuacBqGMyvdYn6CtTGnbnMPeUWOYRbkqdFMvcrvPt"
            },
            "user_key": {
                "algorithm": "http://www.w3.org/2001/04/xmlenc#sha256",
                "text_hint": "The passphrase you chose at checkout",
                "key_check": "1N1xo1mRNtN6xJLSvUvsLnRmmDW9vBuXDjh4RlCMDKhLmsAS/saRIGUiqFnLiLGj"
            }
        },
        "links": [
            {
                "rel": "hint",
                "href": "https://provider.example.org/hint",
                "type": "text/html"
            },
            {
                "rel": "publication",
                "href": "https://provider.example.org/pub.epub",
                "type": "application/epub+zip"
            },
            {
                "rel": "status",
                "href": STATUS_URL,
                "type": "application/vnd.readium.license.status.v1.0+json"
            }
        ],
        "rights": {
            "start": "2020-01-01T00:00:00Z",
            "end": "2030-01-01T00:00:00Z"
        },
        "signature": {
            "algorithm": "http://www.w3.org/2001/04/xmldsig-more#ecdsa-sha256",
            "certificate": "MIIDEjCCAfqgAwIBAgI=",
            "value": "q/3eUXbystjrr+1pzXzkMgNnX77S9UmSgWeUbXGQRDk="
        }
    })
}

/// Removes the `status` link so no Status Document dialogue happens.
pub fn strip_status_link(license: &mut Value) {
    let links = license["links"].as_array_mut().unwrap();
    links.retain(|l| l["rel"] != "status");
}

/// A Status Document matching [`license_json`]: active, same license
/// timestamp, `license` link pointing at [`LICENSE_URL`], no register link.
pub fn status_json() -> Value {
    json!({
        "id": "df09ac25-a386-4c5c-b167-33ce4c36ca65",
        "status": "active",
        "message": "The license is active",
        "updated": {
            "license": "2020-01-01T00:00:00Z",
            "status": "2024-06-01T00:00:00Z"
        },
        "links": [
            {
                "rel": "license",
                "href": LICENSE_URL,
                "type": "application/vnd.readium.lcp.license.v1.0+json"
            }
        ]
    })
}

/// Adds a templated `register` link to a Status Document.
pub fn add_register_link(status: &mut Value) {
    status["links"].as_array_mut().unwrap().push(json!({
        "rel": "register",
        "href": "https://lsd.example.org/register/df09ac25{?id,name}",
        "type": "application/vnd.readium.license.status.v1.0+json",
        "templated": true
    }));
}

pub fn to_bytes(value: &Value) -> Vec<u8> {
    serde_json::to_vec(value).unwrap()
}

pub fn license_doc(value: &Value) -> LicenseDocument {
    LicenseDocument::from_bytes(&to_bytes(value)).unwrap()
}

// ── Observers ───────────────────────────────────────────────────

pub type Outcome = (Option<Arc<ValidatedDocuments>>, Option<LcpError>);
pub type Outcomes = Arc<Mutex<Vec<Outcome>>>;

/// An observer that records every notification it receives.
pub fn recording_observer() -> (Observer, Outcomes) {
    let outcomes: Outcomes = Arc::new(Mutex::new(Vec::new()));
    let sink = outcomes.clone();
    let observer: Observer = Box::new(move |documents, error| {
        sink.lock().unwrap().push((documents, error));
    });
    (observer, outcomes)
}

// ── Service mocks ───────────────────────────────────────────────

/// In-memory `NetworkFetcher` with programmed responses per URL.
#[derive(Default)]
pub struct MockNetwork {
    responses: Mutex<HashMap<String, Vec<u8>>>,
    pub requests: Mutex<Vec<String>>,
}

impl MockNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, url: &str, body: Vec<u8>) {
        self.responses.lock().unwrap().insert(url.to_string(), body);
    }

    pub fn requested_urls(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl NetworkFetcher for MockNetwork {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, LcpError> {
        self.requests.lock().unwrap().push(url.to_string());
        self.responses
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| LcpError::Network(format!("GET {url} returned 404 Not Found")))
    }
}

/// `CrlService` returning fixed bytes, or failing.
pub struct MockCrl {
    result: Result<Vec<u8>, String>,
}

impl MockCrl {
    pub fn new() -> Self {
        Self {
            result: Ok(b"-----BEGIN X509 CRL-----".to_vec()),
        }
    }

    pub fn failing() -> Self {
        Self {
            result: Err("CRL endpoint unreachable".to_string()),
        }
    }
}

#[async_trait]
impl CrlService for MockCrl {
    async fn retrieve(&self) -> Result<Vec<u8>, LcpError> {
        self.result.clone().map_err(LcpError::Network)
    }
}

/// `PassphraseService` answering from a queue, then a fallback.
pub struct MockPassphrases {
    queue: Mutex<VecDeque<Option<String>>>,
    fallback: Option<String>,
    pub requests: AtomicUsize,
}

impl MockPassphrases {
    /// Always answers with the given passphrase (or cancellation).
    pub fn always(answer: Option<&str>) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            fallback: answer.map(str::to_string),
            requests: AtomicUsize::new(0),
        }
    }

    /// Answers from the sequence first, then repeats the last entry.
    pub fn sequence(answers: Vec<Option<&str>>) -> Self {
        let fallback = answers.last().cloned().flatten().map(str::to_string);
        Self {
            queue: Mutex::new(answers.into_iter().map(|a| a.map(str::to_string)).collect()),
            fallback,
            requests: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl PassphraseService for MockPassphrases {
    async fn request(
        &self,
        _license: &LicenseDocument,
        _authenticator: Option<&dyn LcpAuthenticating>,
    ) -> Option<String> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        match self.queue.lock().unwrap().pop_front() {
            Some(answer) => answer,
            None => self.fallback.clone(),
        }
    }
}

/// What a `MockDevice` does on its first registration call.
pub enum DeviceBehavior {
    /// Registered silently; no status bytes returned.
    Silent,
    /// Server replied with fresh Status Document bytes.
    StatusBytes(Vec<u8>),
    /// Registration failed.
    Fail(String),
}

/// `DeviceService` honoring the already-registered contract: after one
/// successful call it always returns `Ok(None)`.
pub struct MockDevice {
    behavior: Mutex<DeviceBehavior>,
    pub calls: AtomicUsize,
}

impl MockDevice {
    pub fn new(behavior: DeviceBehavior) -> Self {
        Self {
            behavior: Mutex::new(behavior),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl DeviceService for MockDevice {
    async fn register_license(
        &self,
        _license: &LicenseDocument,
        _link: &Link,
    ) -> Result<Option<Vec<u8>>, LcpError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let behavior = std::mem::replace(&mut *self.behavior.lock().unwrap(), DeviceBehavior::Silent);
        match behavior {
            DeviceBehavior::Silent => Ok(None),
            DeviceBehavior::StatusBytes(bytes) => Ok(Some(bytes)),
            DeviceBehavior::Fail(message) => Err(LcpError::Network(message)),
        }
    }
}

/// `LicenseRepository` recording added license ids, optionally failing.
pub struct MockRepository {
    fail: bool,
    pub licenses: Mutex<Vec<String>>,
}

impl MockRepository {
    pub fn new() -> Self {
        Self {
            fail: false,
            licenses: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            licenses: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl LicenseRepository for MockRepository {
    async fn add_license(&self, license: &LicenseDocument) -> Result<(), LcpError> {
        if self.fail {
            return Err(LcpError::Repository("database is locked".to_string()));
        }
        self.licenses.lock().unwrap().push(license.id().to_string());
        Ok(())
    }
}

/// `DrmEngine` accepting one passphrase; `production` controls the
/// startup probe answer.
pub struct MockDrm {
    pub production: bool,
    accepted: String,
}

impl MockDrm {
    pub fn new() -> Self {
        Self {
            production: false,
            accepted: PASSPHRASE.to_string(),
        }
    }

    pub fn production() -> Self {
        Self {
            production: true,
            accepted: PASSPHRASE.to_string(),
        }
    }
}

#[async_trait]
impl DrmEngine for MockDrm {
    async fn find_one_valid_passphrase(
        &self,
        _license_json: &str,
        candidates: &[String],
    ) -> Option<String> {
        if self.production {
            candidates.first().cloned()
        } else {
            None
        }
    }

    async fn create_context(
        &self,
        _license_json: &str,
        passphrase: &str,
        _crl: &[u8],
    ) -> Result<DrmContext, LcpError> {
        if passphrase != self.accepted {
            return Err(LcpError::Integrity("user key check failed".to_string()));
        }
        Ok(DrmContext {
            hashed_passphrase: "b221d9dbb083a7f33428d7c2a3c3198ae925614d70210e28716ccaa7cd4ddb79"
                .to_string(),
            encrypted_content_key: "bRWLJzzcZJMFEELFLTqJxQ==".to_string(),
            token: "session-token".to_string(),
            profile: "http://readium.org/lcp/basic-profile".to_string(),
        })
    }
}

// ── Harness ─────────────────────────────────────────────────────

/// Installs a subscriber honoring `RUST_LOG`, so failing runs can be
/// replayed with transition logging.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// One set of mocks plus the machine built on them.
pub struct Harness {
    pub network: Arc<MockNetwork>,
    pub crl: Arc<MockCrl>,
    pub passphrases: Arc<MockPassphrases>,
    pub device: Arc<MockDevice>,
    pub repository: Arc<MockRepository>,
    pub drm: Arc<MockDrm>,
}

impl Harness {
    /// Defaults: every URL 404s, CRL available, passphrase always given,
    /// silent device registration, working repository, non-production DRM.
    pub fn new() -> Self {
        init_tracing();
        Self {
            network: Arc::new(MockNetwork::new()),
            crl: Arc::new(MockCrl::new()),
            passphrases: Arc::new(MockPassphrases::always(Some(PASSPHRASE))),
            device: Arc::new(MockDevice::new(DeviceBehavior::Silent)),
            repository: Arc::new(MockRepository::new()),
            drm: Arc::new(MockDrm::new()),
        }
    }

    pub fn services(&self) -> ValidationServices {
        ValidationServices {
            network: self.network.clone(),
            crl: self.crl.clone(),
            passphrases: self.passphrases.clone(),
            device: self.device.clone(),
            repository: self.repository.clone(),
            drm: self.drm.clone(),
        }
    }

    pub async fn validation(&self) -> LicenseValidation {
        LicenseValidation::new(self.services(), None, Box::new(|_| {})).await
    }
}
