//! Synthetic external sources.
//!
//! Each source contributes exactly one non-authoritative listing per query,
//! in declaration order, with an outbound link built from a template.

use serde::Serialize;

use crate::models::plus_encode;

/// Placeholder for the query inside a link template.
pub const QUERY_PLACEHOLDER: &str = "{query}";

/// A named external marketplace with an outbound link template.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyntheticSource {
    pub name: String,
    /// URL containing [`QUERY_PLACEHOLDER`].
    pub link_template: String,
}

impl SyntheticSource {
    pub fn new(name: &str, link_template: &str) -> Self {
        Self {
            name: name.to_string(),
            link_template: link_template.to_string(),
        }
    }

    /// Outbound link for `query`, with spaces encoded as `+`.
    pub fn link_for(&self, query: &str) -> String {
        self.link_template
            .replace(QUERY_PLACEHOLDER, &plus_encode(query))
    }
}

/// Google shopping, Amazon, and Bing.
pub fn default_sources() -> Vec<SyntheticSource> {
    vec![
        SyntheticSource::new("Google", "https://www.google.com/search?tbm=shop&q={query}"),
        SyntheticSource::new("Amazon", "https://www.amazon.com/s?k={query}"),
        SyntheticSource::new("Bing", "https://www.bing.com/search?q={query}+buy"),
    ]
}
