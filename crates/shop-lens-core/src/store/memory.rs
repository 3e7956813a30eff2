//! In-memory [`ProductStore`] implementation for tests and embedding.
//!
//! Uses `Vec`s behind `std::sync::RwLock`. Search is a linear
//! case-insensitive substring scan.

use std::sync::RwLock;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{NewProduct, Product, SearchRecord};

use super::{ProductStore, SeedOutcome};

/// In-memory product store.
#[derive(Default)]
pub struct InMemoryStore {
    products: RwLock<Vec<NewProduct>>,
    history: RwLock<Vec<SearchRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(products: Vec<NewProduct>) -> Self {
        Self {
            products: RwLock::new(products),
            history: RwLock::new(Vec::new()),
        }
    }
}

fn matches(product: &NewProduct, needle: &str) -> bool {
    product.search_text().contains(needle)
}

#[async_trait]
impl ProductStore for InMemoryStore {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Product>> {
        let needle = query.to_lowercase();
        let products = self.products.read().unwrap();
        Ok(products
            .iter()
            .filter(|p| matches(p, &needle))
            .take(limit)
            .map(|p| Product {
                title: p.title.clone(),
                description: p.description.clone(),
                price: p.price,
                category: p.category.clone(),
            })
            .collect())
    }

    async fn insert(&self, product: &NewProduct) -> Result<()> {
        self.products.write().unwrap().push(product.clone());
        Ok(())
    }

    async fn seed_if_empty(&self, products: &[NewProduct]) -> Result<SeedOutcome> {
        let mut stored = self.products.write().unwrap();
        if !stored.is_empty() {
            return Ok(SeedOutcome::AlreadyPopulated(stored.len() as i64));
        }
        stored.extend_from_slice(products);
        Ok(SeedOutcome::Inserted(products.len()))
    }

    async fn count(&self) -> Result<i64> {
        Ok(self.products.read().unwrap().len() as i64)
    }

    async fn audit(&self, query: &str, results_count: i64) -> Result<()> {
        self.history.write().unwrap().push(SearchRecord {
            query: query.to_string(),
            results_count,
            searched_at: chrono::Utc::now().timestamp(),
        });
        Ok(())
    }

    async fn recent_searches(&self, limit: usize) -> Result<Vec<SearchRecord>> {
        let history = self.history.read().unwrap();
        Ok(history.iter().rev().take(limit).cloned().collect())
    }
}
