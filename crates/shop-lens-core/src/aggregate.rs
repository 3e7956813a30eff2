//! Result aggregation: authoritative products plus synthetic listings.
//!
//! # Algorithm
//!
//! 1. Look up authoritative products: the store when connected (capped at
//!    [`MAX_STORE_RESULTS`]), otherwise a title match against the fallback
//!    catalog.
//! 2. Normalize each product price into the requested currency, keeping
//!    store/fallback order.
//! 3. Append one listing per synthetic source, in declaration order, with a
//!    price sampled from the quality tier's range plus a sub-unit offset.
//! 4. Write one best-effort audit record when the store is connected.
//!
//! Nothing is deduplicated, re-ranked, or truncated beyond the store cap.
//! Store and audit failures are reported in the returned [`Aggregation`]
//! rather than raised.

use serde::Serialize;

use crate::currency::RateTable;
use crate::facets::FacetRecord;
use crate::fallback::match_fallback;
use crate::models::{plus_encode, Listing, Product};
use crate::pricing::{PriceSource, PriceTiers, DEFAULT_PRICE_OFFSET};
use crate::sources::SyntheticSource;
use crate::store::{StoreHandle, MAX_STORE_RESULTS};

/// Rejected query input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryError {
    /// Empty or whitespace-only query.
    Empty,
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryError::Empty => f.write_str("query must not be empty"),
        }
    }
}

impl std::error::Error for QueryError {}

/// Trim `query`, rejecting it if nothing is left.
pub fn validate_query(query: &str) -> Result<&str, QueryError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        Err(QueryError::Empty)
    } else {
        Ok(trimmed)
    }
}

/// How the authoritative lookup went.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StoreOutcome {
    /// Store answered.
    Ok,
    /// Store is connected but this search failed; no authoritative results.
    Degraded { reason: String },
    /// Store unreachable for the whole process; fallback catalog used.
    Unavailable,
}

/// What happened to the audit record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AuditOutcome {
    Recorded,
    /// No store to write to.
    Skipped,
    Failed { reason: String },
}

/// Listings for one query plus the status of each side effect.
#[derive(Debug, Clone, Serialize)]
pub struct Aggregation {
    pub listings: Vec<Listing>,
    pub store: StoreOutcome,
    pub audit: AuditOutcome,
}

impl Aggregation {
    pub fn authoritative_count(&self) -> usize {
        self.listings.iter().filter(|l| l.is_authoritative).count()
    }
}

/// Tunables that are fixed for the life of the process.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateSettings {
    /// Provenance label for store-backed listings.
    pub store_label: String,
    /// Provenance label for fallback-catalog listings.
    pub fallback_label: String,
    /// Added to every sampled synthetic price.
    pub price_offset: f64,
    /// Store result cap, never above [`MAX_STORE_RESULTS`].
    pub store_limit: usize,
}

impl Default for AggregateSettings {
    fn default() -> Self {
        Self {
            store_label: "Product Store".to_string(),
            fallback_label: "Local Database".to_string(),
            price_offset: DEFAULT_PRICE_OFFSET,
            store_limit: MAX_STORE_RESULTS,
        }
    }
}

/// Read-only view over the process-wide tables needed to aggregate.
pub struct Aggregator<'a> {
    pub rates: &'a RateTable,
    pub tiers: &'a PriceTiers,
    pub sources: &'a [SyntheticSource],
    pub fallback: &'a [Product],
    pub prices: &'a dyn PriceSource,
    pub settings: &'a AggregateSettings,
}

impl Aggregator<'_> {
    /// Build the ordered listing sequence for `query`.
    pub async fn aggregate(
        &self,
        store: &StoreHandle,
        query: &str,
        facets: &FacetRecord,
        currency: &str,
    ) -> Aggregation {
        let (products, label, store_outcome) = self.authoritative(store, query).await;

        let mut listings: Vec<Listing> = products
            .iter()
            .map(|p| Listing {
                title: p.title.clone(),
                description: p.description.clone(),
                price_display: self.rates.normalize(p.price, currency),
                source_label: label.to_string(),
                link: authoritative_link(query, p, &store_outcome),
                is_authoritative: true,
            })
            .collect();

        for source in self.sources {
            let amount = self.synthetic_price(facets);
            listings.push(Listing {
                title: format!("{} - {} Result", query, source.name),
                description: format!("External result from {}", source.name),
                price_display: self.rates.normalize(amount, currency),
                source_label: source.name.clone(),
                link: source.link_for(query),
                is_authoritative: false,
            });
        }

        let audit = audit(store, query, products.len()).await;

        Aggregation {
            listings,
            store: store_outcome,
            audit,
        }
    }

    /// Sample one synthetic price (base unit) for the facets' quality tier.
    pub fn synthetic_price(&self, facets: &FacetRecord) -> f64 {
        let range = self.tiers.range_for(facets.quality);
        self.prices.sample(range) as f64 + self.settings.price_offset
    }

    async fn authoritative(
        &self,
        store: &StoreHandle,
        query: &str,
    ) -> (Vec<Product>, &str, StoreOutcome) {
        match store.store() {
            Some(s) => {
                let limit = self.settings.store_limit.min(MAX_STORE_RESULTS);
                match s.search(query, limit).await {
                    Ok(mut products) => {
                        products.truncate(limit);
                        (products, &self.settings.store_label, StoreOutcome::Ok)
                    }
                    Err(e) => {
                        let reason = format!("{:#}", e);
                        tracing::warn!(%reason, query, "store search failed");
                        (
                            Vec::new(),
                            &self.settings.store_label,
                            StoreOutcome::Degraded { reason },
                        )
                    }
                }
            }
            None => {
                tracing::debug!(query, "searching fallback catalog");
                (
                    match_fallback(self.fallback, query),
                    &self.settings.fallback_label,
                    StoreOutcome::Unavailable,
                )
            }
        }
    }
}

fn authoritative_link(query: &str, product: &Product, outcome: &StoreOutcome) -> String {
    match outcome {
        StoreOutcome::Unavailable => {
            format!("https://www.google.com/search?q={}", plus_encode(query))
        }
        _ => format!(
            "https://www.google.com/search?q={}+{}",
            plus_encode(query),
            plus_encode(&product.title)
        ),
    }
}

async fn audit(store: &StoreHandle, query: &str, results_count: usize) -> AuditOutcome {
    let Some(s) = store.store() else {
        return AuditOutcome::Skipped;
    };
    match s.audit(query, results_count as i64).await {
        Ok(()) => AuditOutcome::Recorded,
        Err(e) => {
            let reason = format!("{:#}", e);
            tracing::warn!(%reason, query, "failed to record search audit");
            AuditOutcome::Failed { reason }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facets::{extract, Quality};
    use crate::fallback::fallback_catalog;
    use crate::models::{NewProduct, SearchRecord};
    use crate::pricing::{PriceRange, SequenceSource, ThreadRngSource};
    use crate::sources::default_sources;
    use crate::store::memory::InMemoryStore;
    use crate::store::{ProductStore, SeedOutcome};
    use anyhow::{bail, Result};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct Fixture {
        rates: RateTable,
        tiers: PriceTiers,
        sources: Vec<SyntheticSource>,
        fallback: Vec<Product>,
        settings: AggregateSettings,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                rates: RateTable::standard(),
                tiers: PriceTiers::standard(),
                sources: default_sources(),
                fallback: fallback_catalog(),
                settings: AggregateSettings::default(),
            }
        }

        fn aggregator<'a>(&'a self, prices: &'a dyn PriceSource) -> Aggregator<'a> {
            Aggregator {
                rates: &self.rates,
                tiers: &self.tiers,
                sources: &self.sources,
                fallback: &self.fallback,
                prices,
                settings: &self.settings,
            }
        }
    }

    fn new_product(title: &str, price: f64) -> NewProduct {
        NewProduct {
            title: title.to_string(),
            description: format!("{} description", title),
            category: Some("computer".to_string()),
            quality: None,
            price,
        }
    }

    /// Store whose search and audit always fail.
    struct BrokenStore;

    #[async_trait]
    impl ProductStore for BrokenStore {
        async fn search(&self, _query: &str, _limit: usize) -> Result<Vec<Product>> {
            bail!("disk on fire")
        }
        async fn insert(&self, _product: &NewProduct) -> Result<()> {
            bail!("read only")
        }
        async fn seed_if_empty(&self, _products: &[NewProduct]) -> Result<SeedOutcome> {
            bail!("read only")
        }
        async fn count(&self) -> Result<i64> {
            bail!("no count")
        }
        async fn audit(&self, _query: &str, _results_count: i64) -> Result<()> {
            bail!("audit log full")
        }
        async fn recent_searches(&self, _limit: usize) -> Result<Vec<SearchRecord>> {
            Ok(Vec::new())
        }
    }

    /// Store that searches normally but cannot write audit records.
    struct AuditlessStore(InMemoryStore);

    #[async_trait]
    impl ProductStore for AuditlessStore {
        async fn search(&self, query: &str, limit: usize) -> Result<Vec<Product>> {
            self.0.search(query, limit).await
        }
        async fn insert(&self, product: &NewProduct) -> Result<()> {
            self.0.insert(product).await
        }
        async fn seed_if_empty(&self, products: &[NewProduct]) -> Result<SeedOutcome> {
            self.0.seed_if_empty(products).await
        }
        async fn count(&self) -> Result<i64> {
            self.0.count().await
        }
        async fn audit(&self, _query: &str, _results_count: i64) -> Result<()> {
            bail!("audit log full")
        }
        async fn recent_searches(&self, limit: usize) -> Result<Vec<SearchRecord>> {
            self.0.recent_searches(limit).await
        }
    }

    fn usd_amount(display: &str) -> f64 {
        display.trim_start_matches('$').parse().unwrap()
    }

    #[test]
    fn test_validate_query() {
        assert_eq!(validate_query("   "), Err(QueryError::Empty));
        assert_eq!(validate_query(""), Err(QueryError::Empty));
        assert_eq!(validate_query("  laptop "), Ok("laptop"));
    }

    #[tokio::test]
    async fn test_composition_and_order() {
        let fx = Fixture::new();
        let mem = Arc::new(InMemoryStore::with_products(vec![
            new_product("Laptop A", 1000.0),
            new_product("Tablet", 300.0),
            new_product("Laptop B", 500.0),
        ]));
        let handle = StoreHandle::Connected(mem.clone());
        let prices = ThreadRngSource;
        let facets = extract("laptop");

        let agg = fx
            .aggregator(&prices)
            .aggregate(&handle, "laptop", &facets, "USD")
            .await;

        assert_eq!(agg.listings.len(), 2 + fx.sources.len());
        assert_eq!(agg.authoritative_count(), 2);
        assert_eq!(agg.store, StoreOutcome::Ok);
        assert_eq!(agg.audit, AuditOutcome::Recorded);

        let titles: Vec<&str> = agg.listings.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Laptop A",
                "Laptop B",
                "laptop - Google Result",
                "laptop - Amazon Result",
                "laptop - Bing Result"
            ]
        );
        assert!(agg.listings[..2].iter().all(|l| l.is_authoritative));
        assert!(agg.listings[2..].iter().all(|l| !l.is_authoritative));
        assert_eq!(agg.listings[0].price_display, "$1000.00");
        assert_eq!(agg.listings[0].source_label, "Product Store");
        assert_eq!(
            agg.listings[0].link,
            "https://www.google.com/search?q=laptop+Laptop+A"
        );

        let history = mem.recent_searches(5).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].query, "laptop");
        assert_eq!(history[0].results_count, 2);
    }

    #[tokio::test]
    async fn test_store_cap() {
        let fx = Fixture::new();
        let mem = Arc::new(InMemoryStore::with_products(
            (0..30).map(|i| new_product(&format!("Phone {}", i), 1.0)).collect(),
        ));
        let handle = StoreHandle::Connected(mem);
        let prices = ThreadRngSource;
        let agg = fx
            .aggregator(&prices)
            .aggregate(&handle, "phone", &extract("phone"), "USD")
            .await;
        assert_eq!(agg.authoritative_count(), MAX_STORE_RESULTS);
        assert_eq!(agg.listings.len(), MAX_STORE_RESULTS + 3);
    }

    #[tokio::test]
    async fn test_fallback_when_unavailable() {
        let fx = Fixture::new();
        let handle = StoreHandle::unavailable("connection refused");
        let prices = ThreadRngSource;

        let agg = fx
            .aggregator(&prices)
            .aggregate(&handle, "iPhone", &extract("iPhone"), "USD")
            .await;

        assert_eq!(agg.store, StoreOutcome::Unavailable);
        assert_eq!(agg.audit, AuditOutcome::Skipped);
        assert!(agg.authoritative_count() >= 1);
        let first = &agg.listings[0];
        assert!(first.is_authoritative);
        assert!(first.title.to_lowercase().contains("iphone"));
        assert_eq!(first.source_label, "Local Database");
        assert_eq!(first.price_display, "$1199.00");
        assert_eq!(first.link, "https://www.google.com/search?q=iPhone");
    }

    #[tokio::test]
    async fn test_degraded_store_and_failed_audit_do_not_fail() {
        let fx = Fixture::new();
        let handle = StoreHandle::Connected(Arc::new(BrokenStore));
        let prices = ThreadRngSource;

        let agg = fx
            .aggregator(&prices)
            .aggregate(&handle, "iPhone", &extract("iPhone"), "EUR")
            .await;

        assert!(matches!(agg.store, StoreOutcome::Degraded { .. }));
        assert!(matches!(agg.audit, AuditOutcome::Failed { .. }));
        assert_eq!(agg.authoritative_count(), 0);
        assert_eq!(agg.listings.len(), 3);
        assert!(agg.listings.iter().all(|l| l.price_display.starts_with('€')));
    }

    #[tokio::test]
    async fn test_failed_audit_keeps_store_results() {
        let fx = Fixture::new();
        let store = AuditlessStore(InMemoryStore::with_products(vec![
            new_product("Laptop A", 1000.0),
            new_product("Laptop B", 500.0),
        ]));
        let handle = StoreHandle::Connected(Arc::new(store));
        let prices = ThreadRngSource;

        let agg = fx
            .aggregator(&prices)
            .aggregate(&handle, "laptop", &extract("laptop"), "USD")
            .await;

        assert_eq!(agg.store, StoreOutcome::Ok);
        assert_eq!(
            agg.audit,
            AuditOutcome::Failed {
                reason: "audit log full".to_string()
            }
        );
        assert_eq!(agg.authoritative_count(), 2);
        assert_eq!(agg.listings.len(), 5);
        assert_eq!(agg.listings[0].title, "Laptop A");
        assert_eq!(agg.listings[0].price_display, "$1000.00");
        assert_eq!(agg.listings[0].source_label, "Product Store");
        assert_eq!(agg.listings[1].title, "Laptop B");
        assert_eq!(agg.listings[1].price_display, "$500.00");
    }

    #[tokio::test]
    async fn test_synthetic_prices_within_tier() {
        let fx = Fixture::new();
        let handle = StoreHandle::unavailable("offline");
        let prices = ThreadRngSource;

        for (query, quality) in [
            ("premium camera", Quality::PremiumQuality),
            ("cheap camera", Quality::BudgetFriendly),
            ("camera", Quality::MidRange),
        ] {
            let facets = extract(query);
            assert_eq!(facets.quality, quality);
            let range = fx.tiers.range_for(quality);
            for _ in 0..50 {
                let agg = fx
                    .aggregator(&prices)
                    .aggregate(&handle, query, &facets, "USD")
                    .await;
                for l in agg.listings.iter().filter(|l| !l.is_authoritative) {
                    let amount = usd_amount(&l.price_display);
                    assert!(
                        amount >= range.min as f64 + 0.99 - 1e-6
                            && amount <= range.max as f64 + 0.99 + 1e-6,
                        "{} out of {:?} for {}",
                        amount,
                        range,
                        query
                    );
                }
            }
        }
    }

    #[tokio::test]
    async fn test_synthetic_price_with_fixed_source() {
        let fx = Fixture::new();
        let handle = StoreHandle::unavailable("offline");
        let facets = extract("premium headphones");

        let low = SequenceSource::lowest();
        let agg = fx
            .aggregator(&low)
            .aggregate(&handle, "premium headphones", &facets, "USD")
            .await;
        assert!(agg.listings.iter().all(|l| l.price_display == "$600.99"));

        let high = SequenceSource::highest();
        let agg = fx
            .aggregator(&high)
            .aggregate(&handle, "premium headphones", &facets, "JPY")
            .await;
        // 1500.99 * 110 = 165108.9
        assert!(agg.listings.iter().all(|l| l.price_display == "¥165108"));
    }

    #[test]
    fn test_unlisted_tier_uses_default_range() {
        let mut fx = Fixture::new();
        fx.tiers = PriceTiers::new(PriceRange { min: 100, max: 500 });
        let prices = SequenceSource::lowest();
        let price = fx.aggregator(&prices).synthetic_price(&extract("flagship"));
        assert!((price - 100.99).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_synthetic_links_and_labels() {
        let fx = Fixture::new();
        let handle = StoreHandle::unavailable("offline");
        let prices = ThreadRngSource;
        let agg = fx
            .aggregator(&prices)
            .aggregate(&handle, "gaming mouse", &extract("gaming mouse"), "USD")
            .await;

        let amazon = &agg.listings[1];
        assert_eq!(amazon.source_label, "Amazon");
        assert_eq!(amazon.link, "https://www.amazon.com/s?k=gaming+mouse");
        assert_eq!(amazon.description, "External result from Amazon");
    }
}
