use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use shop_lens_core::facets::QUALITY_DICTIONARIES;
use shop_lens_core::pricing::DEFAULT_PRICE_OFFSET;
use shop_lens_core::store::MAX_STORE_RESULTS;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    pub server: ServerConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
    #[serde(default)]
    pub currencies: HashMap<String, CurrencyConfig>,
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_currency")]
    pub default_currency: String,
    #[serde(default = "default_max_store_results")]
    pub max_store_results: usize,
    #[serde(default = "default_store_label")]
    pub store_label: String,
    #[serde(default = "default_fallback_label")]
    pub fallback_label: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_currency: default_currency(),
            max_store_results: default_max_store_results(),
            store_label: default_store_label(),
            fallback_label: default_fallback_label(),
        }
    }
}

fn default_currency() -> String {
    "USD".to_string()
}
fn default_max_store_results() -> usize {
    MAX_STORE_RESULTS
}
fn default_store_label() -> String {
    "Product Store".to_string()
}
fn default_fallback_label() -> String {
    "Local Database".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct PricingConfig {
    #[serde(default = "default_offset")]
    pub offset: f64,
    /// Quality tier name → `[min, max]`. The `default` key covers
    /// tiers that are not listed.
    #[serde(default = "default_tiers")]
    pub tiers: HashMap<String, [u32; 2]>,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            offset: default_offset(),
            tiers: default_tiers(),
        }
    }
}

fn default_offset() -> f64 {
    DEFAULT_PRICE_OFFSET
}

fn default_tiers() -> HashMap<String, [u32; 2]> {
    HashMap::from([
        ("premium_quality".to_string(), [600, 1500]),
        ("mid_range".to_string(), [200, 600]),
        ("budget_friendly".to_string(), [50, 200]),
        (DEFAULT_TIER.to_string(), [100, 500]),
    ])
}

/// Key in `[pricing.tiers]` for the fallback range.
pub const DEFAULT_TIER: &str = "default";

/// An extra or overriding row for the rate table.
#[derive(Debug, Deserialize, Clone)]
pub struct CurrencyConfig {
    pub rate: f64,
    pub symbol: String,
    #[serde(default)]
    pub integer_display: bool,
}

/// A synthetic source. `link` must contain `{query}` to vary per query.
#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    pub name: String,
    pub link: String,
}

/// Tier names accepted in `[pricing.tiers]`: each quality name plus
/// [`DEFAULT_TIER`].
fn known_tiers() -> Vec<&'static str> {
    QUALITY_DICTIONARIES
        .iter()
        .map(|(quality, _)| quality.as_str())
        .chain(std::iter::once(DEFAULT_TIER))
        .collect()
}

fn is_known_tier(name: &str) -> bool {
    known_tiers().iter().any(|t| *t == name)
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    // Validate search
    if config.search.max_store_results == 0 || config.search.max_store_results > MAX_STORE_RESULTS
    {
        anyhow::bail!("search.max_store_results must be in 1..={}", MAX_STORE_RESULTS);
    }
    if config.search.default_currency.trim().is_empty() {
        anyhow::bail!("search.default_currency must not be empty");
    }

    // Validate pricing
    if !(0.0..1.0).contains(&config.pricing.offset) {
        anyhow::bail!("pricing.offset must be in [0.0, 1.0)");
    }
    for (tier, [min, max]) in &config.pricing.tiers {
        if !is_known_tier(tier) {
            anyhow::bail!(
                "pricing.tiers.{}: unknown tier (expected one of {})",
                tier,
                known_tiers().join(", ")
            );
        }
        if min > max {
            anyhow::bail!("pricing.tiers.{}: min {} > max {}", tier, min, max);
        }
    }

    // Validate currencies
    for (code, c) in &config.currencies {
        if c.rate.is_nan() || c.rate <= 0.0 {
            anyhow::bail!("currencies.{}.rate must be > 0", code);
        }
    }

    // Validate sources
    for s in &config.sources {
        if s.name.trim().is_empty() {
            anyhow::bail!("sources: name must not be empty");
        }
    }

    Ok(config)
}
