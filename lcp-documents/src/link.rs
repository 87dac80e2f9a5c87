//! Relation-addressed links shared by both document types.
//!
//! Both the License Document and the Status Document carry a `links` array.
//! A link's `rel` may be a single string or an array of strings on the wire;
//! the model normalizes it to a list. Templated hrefs use the `{?a,b}`
//! query-expansion form (the only form the LCP/LSD wire formats use).

use crate::error::{ParseError, ParseResult};
use serde::{Deserialize, Deserializer, Serialize};

/// Well-known link relations.
pub mod rel {
    /// Location of a passphrase hint page (License Document).
    pub const HINT: &str = "hint";
    /// Location of the protected publication (License Document).
    pub const PUBLICATION: &str = "publication";
    /// Location of the Status Document (License Document).
    pub const STATUS: &str = "status";
    /// Location of the latest License Document (Status Document).
    pub const LICENSE: &str = "license";
    /// Device registration endpoint (Status Document), templated.
    pub const REGISTER: &str = "register";
}

/// A single link object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Relation names. At least one is required.
    #[serde(deserialize_with = "one_or_many")]
    pub rel: Vec<String>,
    /// Target, possibly a URI template when `templated` is set.
    pub href: String,
    /// Media type of the target.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    /// Human-readable title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Expected profile of the target resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    /// Whether `href` is a URI template.
    #[serde(default)]
    pub templated: bool,
}

impl Link {
    /// Returns true if this link carries the given relation.
    #[must_use]
    pub fn has_rel(&self, rel: &str) -> bool {
        self.rel.iter().any(|r| r == rel)
    }

    /// Expands a `{?a,b}` templated href with the given query parameters.
    ///
    /// Parameters not named by the template are ignored; template names
    /// without a supplied value are omitted. Non-templated hrefs are
    /// returned unchanged.
    #[must_use]
    pub fn href_with_params(&self, params: &[(&str, &str)]) -> String {
        let Some(open) = self.href.find("{?") else {
            return self.href.clone();
        };
        let Some(close) = self.href[open..].find('}') else {
            return self.href.clone();
        };
        let names = &self.href[open + 2..open + close];
        let base = format!("{}{}", &self.href[..open], &self.href[open + close + 1..]);

        let query: Vec<String> = names
            .split(',')
            .filter_map(|name| {
                let name = name.trim();
                params
                    .iter()
                    .find(|(k, _)| *k == name)
                    .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
            })
            .collect();

        if query.is_empty() {
            base
        } else {
            let sep = if base.contains('?') { '&' } else { '?' };
            format!("{base}{sep}{}", query.join("&"))
        }
    }

    fn validate(&self) -> ParseResult<()> {
        if self.rel.is_empty() {
            return Err(ParseError::MissingRel {
                href: self.href.clone(),
            });
        }
        if !self.templated && url::Url::parse(&self.href).is_err() {
            return Err(ParseError::InvalidUrl {
                rel: self.rel[0].clone(),
                href: self.href.clone(),
            });
        }
        Ok(())
    }
}

/// The `links` array of a document, addressed by relation name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Links(Vec<Link>);

impl Links {
    /// Returns the first link carrying the given relation.
    #[must_use]
    pub fn link(&self, rel: &str) -> Option<&Link> {
        self.0.iter().find(|l| l.has_rel(rel))
    }

    /// Returns every link carrying the given relation.
    pub fn all(&self, rel: &str) -> impl Iterator<Item = &Link> {
        self.0.iter().filter(move |l| l.has_rel(rel))
    }

    /// Iterates over all links.
    pub fn iter(&self) -> impl Iterator<Item = &Link> {
        self.0.iter()
    }

    /// Number of links.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the document declared no links.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn validate(&self) -> ParseResult<()> {
        for link in &self.0 {
            link.validate()?;
        }
        Ok(())
    }
}

/// Accepts `"rel": "status"` and `"rel": ["status"]` alike.
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(rel) => vec![rel],
        OneOrMany::Many(rels) => rels,
    })
}
