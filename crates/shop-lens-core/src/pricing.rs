//! Quality-tier price ranges and the random source used to sample
//! synthetic prices.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{bail, Result};
use rand::Rng;
use serde::Serialize;

use crate::facets::Quality;

/// Sub-unit offset added to every sampled price.
pub const DEFAULT_PRICE_OFFSET: f64 = 0.99;

/// Inclusive integer price range in the base unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceRange {
    pub min: u32,
    pub max: u32,
}

impl PriceRange {
    pub fn new(min: u32, max: u32) -> Result<Self> {
        if min > max {
            bail!("invalid price range: min {} > max {}", min, max);
        }
        Ok(Self { min, max })
    }

    pub fn contains(&self, n: u32) -> bool {
        (self.min..=self.max).contains(&n)
    }
}

/// Source of uniformly distributed integers.
///
/// Implementations must return a value in `min..=max`.
pub trait PriceSource: Send + Sync {
    fn sample(&self, range: PriceRange) -> u32;
}

/// Process-wide randomness backed by the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngSource;

impl PriceSource for ThreadRngSource {
    fn sample(&self, range: PriceRange) -> u32 {
        rand::thread_rng().gen_range(range.min..=range.max)
    }
}

/// Deterministic source cycling through a fixed list of offsets.
///
/// Each value is taken as an offset from `range.min` and clamped to the
/// range, so any sequence stays inside whatever range is requested.
#[derive(Debug)]
pub struct SequenceSource {
    values: Vec<u32>,
    cursor: AtomicUsize,
}

impl SequenceSource {
    pub fn new(values: Vec<u32>) -> Self {
        Self {
            values,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Always returns `range.min`.
    pub fn lowest() -> Self {
        Self::new(vec![0])
    }

    /// Always returns `range.max`.
    pub fn highest() -> Self {
        Self::new(vec![u32::MAX])
    }
}

impl PriceSource for SequenceSource {
    fn sample(&self, range: PriceRange) -> u32 {
        if self.values.is_empty() {
            return range.min;
        }
        let i = self.cursor.fetch_add(1, Ordering::Relaxed) % self.values.len();
        range.min.saturating_add(self.values[i]).min(range.max)
    }
}

/// Quality tier name → price range, with a default for unlisted tiers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceTiers {
    tiers: HashMap<String, PriceRange>,
    default: PriceRange,
}

impl PriceTiers {
    pub fn new(default: PriceRange) -> Self {
        Self {
            tiers: HashMap::new(),
            default,
        }
    }

    /// premium 600–1500, mid 200–600, budget 50–200, default 100–500.
    pub fn standard() -> Self {
        let mut tiers = Self::new(PriceRange { min: 100, max: 500 });
        tiers.set(Quality::PremiumQuality.as_str(), PriceRange { min: 600, max: 1500 });
        tiers.set(Quality::MidRange.as_str(), PriceRange { min: 200, max: 600 });
        tiers.set(Quality::BudgetFriendly.as_str(), PriceRange { min: 50, max: 200 });
        tiers
    }

    pub fn set(&mut self, tier: &str, range: PriceRange) {
        self.tiers.insert(tier.to_string(), range);
    }

    pub fn set_default(&mut self, range: PriceRange) {
        self.default = range;
    }

    pub fn default_range(&self) -> PriceRange {
        self.default
    }

    /// Range for `quality`, or the default range if the tier is not listed.
    pub fn range_for(&self, quality: Quality) -> PriceRange {
        self.tiers
            .get(quality.as_str())
            .copied()
            .unwrap_or(self.default)
    }
}

impl Default for PriceTiers {
    fn default() -> Self {
        Self::standard()
    }
}
