//! License Document model.
//!
//! The License Document is the signed JSON artifact embedded in a protected
//! publication. It carries the encryption parameters, the usage rights
//! granted to the user, and the service endpoints (hint page, Status
//! Document, publication download).
//!
//! The model wraps the exact bytes it was parsed from; `raw()` returns them
//! unchanged so callers can content-address the document and write it back
//! into the container byte-for-byte.

use crate::error::{ParseError, ParseResult};
use crate::link::{Link, Links};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A parsed License Document.
#[derive(Debug, Clone, PartialEq)]
pub struct LicenseDocument {
    raw: String,
    doc: LicenseJson,
}

/// Wire representation of the License Document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct LicenseJson {
    id: String,
    issued: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated: Option<DateTime<Utc>>,
    provider: String,
    encryption: Encryption,
    links: Links,
    #[serde(default)]
    rights: Rights,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user: Option<User>,
    signature: Signature,
}

/// The `encryption` object: how the publication content is protected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Encryption {
    /// Encryption profile URI.
    pub profile: String,
    /// The content key, encrypted with the user key.
    pub content_key: ContentKey,
    /// How the user key is derived from the passphrase.
    pub user_key: UserKey,
}

/// The encrypted content key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentKey {
    /// Encryption algorithm URI.
    pub algorithm: String,
    /// Base64 content key, encrypted with the user key.
    pub encrypted_value: String,
}

/// Parameters for deriving the user key from the passphrase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserKey {
    /// Hashing algorithm URI.
    pub algorithm: String,
    /// Hint shown to the user when prompting for the passphrase.
    pub text_hint: String,
    /// Base64 value used to verify a candidate passphrase.
    pub key_check: String,
}

/// The `rights` object. All fields are optional; an absent field means the
/// right is unrestricted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rights {
    /// Maximum number of printable pages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub print: Option<u32>,
    /// Maximum number of copyable characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copy: Option<u32>,
    /// Date the license becomes usable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    /// Date the license expires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
}

/// The `user` object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Provider-scoped user identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// User email, possibly encrypted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// The `signature` object covering the canonical document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    /// Signature algorithm URI.
    pub algorithm: String,
    /// Base64 X.509 certificate of the provider.
    pub certificate: String,
    /// Base64 signature value.
    pub value: String,
}

impl LicenseDocument {
    /// Parses a License Document from its raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] when the bytes are not UTF-8 JSON, a mandatory
    /// field is missing, or a non-templated link href is not a valid URL.
    pub fn from_bytes(bytes: &[u8]) -> ParseResult<Self> {
        let raw = std::str::from_utf8(bytes)
            .map_err(|_| ParseError::Encoding)?
            .to_owned();
        let doc: LicenseJson =
            serde_json::from_str(&raw).map_err(|e| ParseError::Json(e.to_string()))?;
        doc.links.validate()?;
        Ok(Self { raw, doc })
    }

    /// The exact bytes this document was parsed from.
    #[must_use]
    pub fn raw(&self) -> &[u8] {
        self.raw.as_bytes()
    }

    /// The document as a JSON string, byte-identical to `raw()`.
    #[must_use]
    pub fn raw_str(&self) -> &str {
        &self.raw
    }

    /// License identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.doc.id
    }

    /// Issuance date.
    #[must_use]
    pub fn issued(&self) -> DateTime<Utc> {
        self.doc.issued
    }

    /// Last-update date, falling back to the issuance date.
    #[must_use]
    pub fn updated(&self) -> DateTime<Utc> {
        self.doc.updated.unwrap_or(self.doc.issued)
    }

    /// License provider URI.
    #[must_use]
    pub fn provider(&self) -> &str {
        &self.doc.provider
    }

    /// Normalized encryption profile URI.
    #[must_use]
    pub fn profile(&self) -> &str {
        &self.doc.encryption.profile
    }

    /// The full encryption object.
    #[must_use]
    pub fn encryption(&self) -> &Encryption {
        &self.doc.encryption
    }

    /// The passphrase hint shown when prompting the user.
    #[must_use]
    pub fn text_hint(&self) -> &str {
        &self.doc.encryption.user_key.text_hint
    }

    /// Usage rights granted by this license.
    #[must_use]
    pub fn rights(&self) -> &Rights {
        &self.doc.rights
    }

    /// User information, when the provider included any.
    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.doc.user.as_ref()
    }

    /// Provider signature.
    #[must_use]
    pub fn signature(&self) -> &Signature {
        &self.doc.signature
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
