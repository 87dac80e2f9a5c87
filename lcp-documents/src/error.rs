//! Error types for document parsing.

use thiserror::Error;

/// Result type for document construction.
pub type ParseResult<T> = Result<T, ParseError>;

/// Errors raised while constructing a document from raw bytes.
///
/// Variants carry `String` detail rather than source errors so the type
/// stays `Clone` and can be fanned out to multiple validation observers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The raw bytes are not valid UTF-8.
    #[error("document is not valid UTF-8")]
    Encoding,

    /// The document is not well-formed JSON or is missing mandatory fields.
    #[error("malformed document: {0}")]
    Json(String),

    /// A non-templated link href is not an absolute URL.
    #[error("invalid URL in `{rel}` link: {href}")]
    InvalidUrl {
        /// First relation of the offending link.
        rel: String,
        /// The href that failed to parse.
        href: String,
    },

    /// A link object has an empty relation list.
    #[error("link without a relation: {href}")]
    MissingRel {
        /// The href of the offending link.
        href: String,
    },
}
