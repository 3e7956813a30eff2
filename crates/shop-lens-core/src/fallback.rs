//! Fixed catalog used when the product store is unreachable.

use crate::models::Product;

/// The three built-in fallback products, in display order.
pub fn fallback_catalog() -> Vec<Product> {
    vec![
        Product {
            title: "iPhone 15 Pro Max".to_string(),
            description: "Latest Apple smartphone".to_string(),
            price: 1199.0,
            category: Some("mobile_device".to_string()),
        },
        Product {
            title: "MacBook Pro M3".to_string(),
            description: "Professional laptop".to_string(),
            price: 1999.0,
            category: Some("computer".to_string()),
        },
        Product {
            title: "Sony WH-1000XM5".to_string(),
            description: "Noise canceling headphones".to_string(),
            price: 399.0,
            category: Some("audio_device".to_string()),
        },
    ]
}

/// Entries of `catalog` whose title contains `query`, case-insensitively.
///
/// Catalog order is preserved. An empty query matches everything.
pub fn match_fallback(catalog: &[Product], query: &str) -> Vec<Product> {
    let needle = query.to_lowercase();
    catalog
        .iter()
        .filter(|p| p.title.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_is_case_insensitive() {
        let hits = match_fallback(&fallback_catalog(), "iphone");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "iPhone 15 Pro Max");
    }

    #[test]
    fn test_match_preserves_order() {
        let hits = match_fallback(&fallback_catalog(), "pro");
        let titles: Vec<&str> = hits.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["iPhone 15 Pro Max", "MacBook Pro M3"]);
    }

    #[test]
    fn test_match_on_title_only() {
        // "headphones" is only in the description.
        assert!(match_fallback(&fallback_catalog(), "headphones").is_empty());
    }
}
