//! Core data models used throughout Shop Lens.
//!
//! Products are what the store holds; listings are what a query returns.
//! Listings are assembled fresh per request and never persisted.

use serde::{Deserialize, Serialize};

/// A product as returned by the store (or the fallback catalog).
///
/// `price` is expressed in the base unit of account (USD).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub category: Option<String>,
}

/// A product to be inserted into the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    pub quality: Option<String>,
    pub price: f64,
}

impl NewProduct {
    /// Lowercased title, description and category, the text store search
    /// matches against.
    pub fn search_text(&self) -> String {
        search_text(&self.title, &self.description, self.category.as_deref())
    }
}

/// Separates fields in [`search_text`] so a match cannot span two fields.
pub const SEARCH_FIELD_SEPARATOR: char = '\u{1f}';

/// Build the case-folded search key for a product.
///
/// Folding uses Unicode lowercase, so `"Écran"` and `"écran"` compare equal.
pub fn search_text(title: &str, description: &str, category: Option<&str>) -> String {
    let mut text = String::with_capacity(title.len() + description.len() + 16);
    text.push_str(&title.to_lowercase());
    text.push(SEARCH_FIELD_SEPARATOR);
    text.push_str(&description.to_lowercase());
    text.push(SEARCH_FIELD_SEPARATOR);
    if let Some(category) = category {
        text.push_str(&category.to_lowercase());
    }
    text
}

/// One presentable result of a query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing {
    pub title: String,
    pub description: String,
    /// Price formatted in the requested currency.
    pub price_display: String,
    /// Provenance tag: store label or synthetic source name.
    pub source_label: String,
    pub link: String,
    /// `true` for store-backed or fallback results, `false` for synthetic ones.
    pub is_authoritative: bool,
}

/// An audit record of a past query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRecord {
    pub query: String,
    pub results_count: i64,
    /// Unix timestamp (seconds).
    pub searched_at: i64,
}

/// Replace spaces with `+` for use inside an outbound search URL.
pub fn plus_encode(text: &str) -> String {
    text.replace(' ', "+")
}
