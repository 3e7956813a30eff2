//! Bootstrap the store with a sample catalog.
//!
//! Seeding is idempotent: the catalog is inserted only when the store is
//! empty, so running it twice inserts once.

use anyhow::{bail, Result};

use shop_lens_core::models::NewProduct;
use shop_lens_core::store::{ProductStore, StoreHandle};

pub use shop_lens_core::store::SeedOutcome;

/// The five-product sample catalog.
pub fn sample_catalog() -> Vec<NewProduct> {
    let product = |title: &str, description: &str, category: &str, quality: &str, price: f64| {
        NewProduct {
            title: title.to_string(),
            description: description.to_string(),
            category: Some(category.to_string()),
            quality: Some(quality.to_string()),
            price,
        }
    };

    vec![
        product(
            "iPhone 15 Pro Max",
            "Latest Apple smartphone with titanium design",
            "mobile_device",
            "premium_quality",
            1199.0,
        ),
        product(
            "Samsung Galaxy S24",
            "Android flagship with AI features",
            "mobile_device",
            "premium_quality",
            999.0,
        ),
        product(
            "MacBook Pro M3",
            "Professional laptop for developers",
            "computer",
            "premium_quality",
            1999.0,
        ),
        product(
            "Sony WH-1000XM5",
            "Noise canceling headphones",
            "audio_device",
            "premium_quality",
            399.0,
        ),
        product(
            "Acer Aspire 5",
            "Budget laptop for students",
            "computer",
            "budget_friendly",
            499.0,
        ),
    ]
}

/// Insert `catalog` into `store` if and only if the store is empty.
///
/// Safe to call concurrently: the emptiness check and the inserts run as
/// one atomic store operation.
pub async fn seed(store: &dyn ProductStore, catalog: &[NewProduct]) -> Result<SeedOutcome> {
    store.ensure_indexes().await?;

    let outcome = store.seed_if_empty(catalog).await?;
    match outcome {
        SeedOutcome::Inserted(n) => tracing::info!(inserted = n, "seeded product store"),
        SeedOutcome::AlreadyPopulated(n) => tracing::debug!(existing = n, "store already seeded"),
    }
    Ok(outcome)
}

/// Seed the connected store with [`sample_catalog`].
pub async fn seed_store(handle: &StoreHandle) -> Result<SeedOutcome> {
    match handle {
        StoreHandle::Connected(store) => seed(store.as_ref(), &sample_catalog()).await,
        StoreHandle::Unavailable { reason } => bail!("store unavailable: {}", reason),
    }
}

pub async fn run_seed(handle: &StoreHandle) -> Result<()> {
    match seed_store(handle).await? {
        SeedOutcome::Inserted(n) => println!("Successfully added {} products.", n),
        SeedOutcome::AlreadyPopulated(n) => println!("Store already has {} products.", n),
    }
    Ok(())
}
