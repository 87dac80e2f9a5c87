//! Readium LCP document models.
//!
//! This crate parses the two JSON artifacts an LCP client deals with:
//! - the **License Document** (`.lcpl`), embedded in a protected
//!   publication, carrying rights, encryption parameters, and service
//!   endpoints;
//! - the **Status Document**, served by the provider's LSD endpoint,
//!   describing the current lifecycle of one license copy.
//!
//! Both models are immutable value objects wrapping the exact bytes they
//! were parsed from; `raw()` round-trips those bytes unchanged. Validation
//! and the network dialogue live in `lcp-validation`, not here.

mod error;
mod license;
mod link;
mod status;

pub use error::{ParseError, ParseResult};
pub use license::{
    ContentKey, Encryption, LicenseDocument, Rights, Signature, User, UserKey,
};
pub use link::{rel, Link, Links};
pub use status::{EventType, PotentialRights, Status, StatusDocument, StatusEvent};
