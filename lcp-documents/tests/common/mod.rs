//! Shared JSON fixtures for document tests.

#![allow(dead_code)]

use serde_json::{json, Value};

/// A complete, valid License Document as a JSON value.
pub fn license_json() -> Value {
    json!({
        "id": "df09ac25-a386-4c5c-b167-33ce4c36ca65",
        "issued": "2024-03-01T10:00:00Z",
        "updated": "2024-03-05T08:30:00Z",
        "provider": "https://provider.example.org",
        "encryption": {
            "profile": "http://readium.org/lcp/basic-profile",
            "content_key": {
                "algorithm": "http://www.w3.org/2001/04/xmlenc#aes256-cbc",
                "encrypted_value": "/k8RpXqf4E2WEunCp76E8PjhS051NXwAXeTD1ioazYxCRGvHLAck/KQ3cCh5JxDmCK0nRLyAxs1X0aA3z55boQ=="
            },
            "user_key": {
                "algorithm": "http://www.w3.org/2001/04/xmlenc#sha256",
                "text_hint": "Enter your passphrase",
                "key_check": "jJEjUDipHK3OjGt6kFq7dcOLZuicQFUYwQ+TYkAIWKm6Xv6kpHFhF7LOkUK/Owww"
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
                "href": "https://provider.example.org/status/df09ac25",
                "type": "application/vnd.readium.license.status.v1.0+json"
            }
        ],
        "rights": {
            "print": 10,
            "copy": 2048,
            "start": "2024-03-01T10:00:00Z",
            "end": "2034-03-01T10:00:00Z"
        },
        "user": {
            "id": "user-731",
            "email": "reader@example.org"
        },
        "signature": {
            "algorithm": "http://www.w3.org/2001/04/xmldsig-more#ecdsa-sha256",
            "certificate": "MIIDEjCCAfqgAwIBAgI=",
            "value": "q/3eUXbystjrr+1pzXzkMgNnX77S9UmSgWeUbXGQRDk="
        }
    })
}

/// A complete, valid Status Document as a JSON value.
pub fn status_json() -> Value {
    json!({
        "id": "df09ac25-a386-4c5c-b167-33ce4c36ca65",
        "status": "active",
        "message": "The license is active",
        "updated": {
            "license": "2024-03-05T08:30:00Z",
            "status": "2024-03-06T12:00:00Z"
        },
        "links": [
            {
                "rel": "license",
                "href": "https://provider.example.org/license/df09ac25",
                "type": "application/vnd.readium.lcp.license.v1.0+json"
            },
            {
                "rel": "register",
                "href": "https://provider.example.org/register/df09ac25{?id,name}",
                "type": "application/vnd.readium.license.status.v1.0+json",
                "templated": true
            }
        ],
        "potential_rights": {
            "end": "2034-03-01T10:00:00Z"
        },
        "events": [
            {
                "type": "register",
                "name": "Living-room tablet",
                "id": "device-1",
                "timestamp": "2024-03-02T09:00:00Z"
            }
        ]
    })
}

/// Serializes a JSON value to bytes.
pub fn to_bytes(value: &Value) -> Vec<u8> {
    serde_json::to_vec(value).unwrap()
}
