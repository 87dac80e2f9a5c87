//! Status Document model.
//!
//! The Status Document is served by the provider's LSD endpoint and
//! describes the current lifecycle of one License Document copy: whether it
//! is still usable, when the license was last updated server-side, where to
//! re-download it, and where to register the reading device.

use crate::error::{ParseError, ParseResult};
use crate::link::{Link, Links};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a license copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// The license is not yet active (no device registered).
    Ready,
    /// At least one device is registered and the license is usable.
    Active,
    /// The rights window has closed.
    Expired,
    /// The user returned the loan.
    Returned,
    /// The provider cancelled the license before first use.
    Cancelled,
    /// The provider revoked the license.
    Revoked,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Ready => "ready",
            Status::Active => "active",
            Status::Expired => "expired",
            Status::Returned => "returned",
            Status::Cancelled => "cancelled",
            Status::Revoked => "revoked",
        };
        f.write_str(s)
    }
}

/// Type of a lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    /// A device was registered.
    Register,
    /// The loan was extended.
    Renew,
    /// The loan was returned.
    Return,
    /// The license was revoked.
    Revoke,
    /// The license was cancelled.
    Cancel,
    /// Any type this client does not know about.
    #[serde(other)]
    Unknown,
}

/// One entry of the Status Document's `events` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEvent {
    /// Event type.
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// Device name, for register events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Device identifier, for register events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// When the event happened.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// The `updated` object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct Updated {
    /// Last time the License Document itself changed.
    license: DateTime<Utc>,
    /// Last time this Status Document changed.
    status: DateTime<Utc>,
}

/// The `potential_rights` object: rights the license may gain (renewals).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PotentialRights {
    /// Latest date the loan can be extended to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
}

/// Wire representation of the Status Document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct StatusJson {
    id: String,
    status: Status,
    message: String,
    updated: Updated,
    links: Links,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    potential_rights: Option<PotentialRights>,
    #[serde(default)]
    events: Vec<StatusEvent>,
}

/// A parsed Status Document.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusDocument {
    raw: String,
    doc: StatusJson,
}

impl StatusDocument {
    /// Parses a Status Document from its raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] when the bytes are not UTF-8 JSON, a mandatory
    /// field is missing, or a non-templated link href is not a valid URL.
    pub fn from_bytes(bytes: &[u8]) -> ParseResult<Self> {
        let raw = std::str::from_utf8(bytes)
            .map_err(|_| ParseError::Encoding)?
            .to_owned();
        let doc: StatusJson =
            serde_json::from_str(&raw).map_err(|e| ParseError::Json(e.to_string()))?;
        doc.links.validate()?;
        Ok(Self { raw, doc })
    }

    /// The exact bytes this document was parsed from.
    #[must_use]
    pub fn raw(&self) -> &[u8] {
        self.raw.as_bytes()
    }

    /// Status Document identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.doc.id
    }

    /// Current lifecycle status.
    #[must_use]
    pub fn status(&self) -> Status {
        self.doc.status
    }

    /// Provider message suitable for display to the user.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.doc.message
    }

    /// Authoritative "latest License Document updated" timestamp.
    #[must_use]
    pub fn license_updated(&self) -> DateTime<Utc> {
        self.doc.updated.license
    }

    /// Last time this Status Document changed.
    #[must_use]
    pub fn status_updated(&self) -> DateTime<Utc> {
        self.doc.updated.status
    }

    /// Rights the license could gain through provider interactions.
    #[must_use]
    pub fn potential_rights(&self) -> Option<&PotentialRights> {
        self.doc.potential_rights.as_ref()
    }

    /// All lifecycle events, oldest first.
    #[must_use]
    pub fn events(&self) -> &[StatusEvent] {
        &self.doc.events
    }

    /// Lifecycle events of one type.
    pub fn events_with_type(&self, event_type: EventType) -> impl Iterator<Item = &StatusEvent> {
        self.doc
            .events
            .iter()
            .filter(move |e| e.event_type == event_type)
    }

    /// All links.
    #[must_use]
    pub fn links(&self) -> &Links {
        &self.doc.links
    }

    /// First link with the given relation.
    #[must_use]
    pub fn link(&self, rel: &str) -> Option<&Link> {
        self.doc.links.link(rel)
    }
}
