//! Process-wide application context.
//!
//! Built once at startup from [`Config`]: the rate table, price tiers,
//! synthetic sources, fallback catalog, random source, and the result of
//! the one-time store connectivity probe. Shared read-only (behind an
//! `Arc` in the server) by every request.

use std::sync::Arc;

use anyhow::{Context, Result};

use shop_lens_core::aggregate::{AggregateSettings, Aggregator};
use shop_lens_core::currency::{CurrencyRate, RateTable};
use shop_lens_core::fallback::fallback_catalog;
use shop_lens_core::models::Product;
use shop_lens_core::pricing::{PriceRange, PriceSource, PriceTiers, ThreadRngSource};
use shop_lens_core::sources::{default_sources, SyntheticSource};
use shop_lens_core::store::{ProductStore, StoreHandle};

use crate::config::{Config, DEFAULT_TIER};
use crate::sqlite_store::SqliteStore;

pub struct AppContext {
    pub config: Config,
    pub rates: RateTable,
    pub tiers: PriceTiers,
    pub sources: Vec<SyntheticSource>,
    pub fallback: Vec<Product>,
    pub settings: AggregateSettings,
    pub prices: Arc<dyn PriceSource>,
    pub store: StoreHandle,
}

impl AppContext {
    /// Build the context and probe the SQLite store once.
    ///
    /// An unreachable store is not an error: the context records it and
    /// queries use the fallback catalog for the life of the process.
    pub async fn connect(config: &Config) -> Result<Self> {
        let probe = SqliteStore::probe(config)
            .await
            .map(|s| Arc::new(s) as Arc<dyn ProductStore>);
        Self::with_store(config, StoreHandle::resolve(probe), Arc::new(ThreadRngSource))
    }

    /// Build the context around an already-resolved store and random source.
    pub fn with_store(
        config: &Config,
        store: StoreHandle,
        prices: Arc<dyn PriceSource>,
    ) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            rates: rate_table(config),
            tiers: price_tiers(config)?,
            sources: synthetic_sources(config),
            fallback: fallback_catalog(),
            settings: AggregateSettings {
                store_label: config.search.store_label.clone(),
                fallback_label: config.search.fallback_label.clone(),
                price_offset: config.pricing.offset,
                store_limit: config.search.max_store_results,
            },
            prices,
            store,
        })
    }

    pub fn aggregator(&self) -> Aggregator<'_> {
        Aggregator {
            rates: &self.rates,
            tiers: &self.tiers,
            sources: &self.sources,
            fallback: &self.fallback,
            prices: self.prices.as_ref(),
            settings: &self.settings,
        }
    }
}

/// Built-in rates with `[currencies.*]` rows merged on top.
fn rate_table(config: &Config) -> RateTable {
    let mut table = RateTable::standard();
    for (code, c) in &config.currencies {
        table.insert(
            code,
            CurrencyRate::new(c.rate, &c.symbol, c.integer_display),
        );
    }
    table
}

fn price_tiers(config: &Config) -> Result<PriceTiers> {
    let mut tiers = match config.pricing.tiers.get(DEFAULT_TIER) {
        Some([min, max]) => PriceTiers::new(
            PriceRange::new(*min, *max).context("pricing.tiers.default")?,
        ),
        None => PriceTiers::new(PriceTiers::standard().default_range()),
    };
    for (name, [min, max]) in &config.pricing.tiers {
        if name == DEFAULT_TIER {
            continue;
        }
        let range =
            PriceRange::new(*min, *max).with_context(|| format!("pricing.tiers.{}", name))?;
        tiers.set(name, range);
    }
    Ok(tiers)
}

fn synthetic_sources(config: &Config) -> Vec<SyntheticSource> {
    if config.sources.is_empty() {
        return default_sources();
    }
    config
        .sources
        .iter()
        .map(|s| SyntheticSource::new(&s.name, &s.link))
        .collect()
}
