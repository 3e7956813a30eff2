//! Rule-based facet extraction for free-text shopping queries.
//!
//! A query is classified along four axes (intent, category, quality,
//! use case) by scanning ordered keyword dictionaries, plus an independent
//! price ceiling parsed from an `under $N` phrase.
//!
//! # Matching rules
//!
//! 1. The query is lowercased once.
//! 2. For each axis, dictionaries are scanned in their declared order.
//! 3. A dictionary matches when **any** of its triggers occurs anywhere in
//!    the lowercased query (plain substring containment, so `"pro"` matches
//!    inside `"product"`).
//! 4. The first matching dictionary wins. Declaration order is the
//!    tie-break: `"buy or compare"` is a purchase, not a comparison.
//!
//! Extraction is a pure function of the query text.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// What the user is trying to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Search,
    Purchase,
    Comparison,
    Recommendation,
}

/// Product category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    MobileDevice,
    Computer,
    AudioDevice,
}

/// Quality tier; also selects the synthetic price range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Quality {
    PremiumQuality,
    BudgetFriendly,
    MidRange,
}

/// What the product will be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UseCase {
    Photography,
    Productivity,
    Entertainment,
    Fitness,
    Travel,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Search => "search",
            Intent::Purchase => "purchase",
            Intent::Comparison => "comparison",
            Intent::Recommendation => "recommendation",
        }
    }
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::MobileDevice => "mobile_device",
            Category::Computer => "computer",
            Category::AudioDevice => "audio_device",
        }
    }
}

impl Quality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Quality::PremiumQuality => "premium_quality",
            Quality::BudgetFriendly => "budget_friendly",
            Quality::MidRange => "mid_range",
        }
    }
}

impl UseCase {
    pub fn as_str(&self) -> &'static str {
        match self {
            UseCase::Photography => "photography",
            UseCase::Productivity => "productivity",
            UseCase::Entertainment => "entertainment",
            UseCase::Fitness => "fitness",
            UseCase::Travel => "travel",
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(Intent, Category, Quality, UseCase);

/// An ordered `(facet, triggers)` table for one axis.
pub type Dictionary<T> = &'static [(T, &'static [&'static str])];

/// Intent dictionaries. `Search` is the default and has no triggers.
pub const INTENT_DICTIONARIES: Dictionary<Intent> = &[
    (
        Intent::Purchase,
        &[
            "buy",
            "purchase",
            "get",
            "need",
            "want",
            "looking for",
            "shopping for",
            "find me",
        ],
    ),
    (
        Intent::Comparison,
        &["compare", "vs", "versus", "difference", "better", "best between"],
    ),
    (
        Intent::Recommendation,
        &["recommend", "suggest", "advice", "what should", "help me choose"],
    ),
];

pub const CATEGORY_DICTIONARIES: Dictionary<Category> = &[
    (
        Category::MobileDevice,
        &["phone", "smartphone", "mobile", "cell phone", "iphone", "android", "device"],
    ),
    (
        Category::Computer,
        &["laptop", "notebook", "computer", "macbook", "pc", "workstation", "ultrabook"],
    ),
    (
        Category::AudioDevice,
        &["headphones", "earbuds", "headset", "speakers", "audio", "sound"],
    ),
];

/// Quality dictionaries. `MidRange` is also the default.
pub const QUALITY_DICTIONARIES: Dictionary<Quality> = &[
    (
        Quality::PremiumQuality,
        &["premium", "high-end", "luxury", "professional", "top-tier", "flagship", "pro"],
    ),
    (
        Quality::BudgetFriendly,
        &["cheap", "budget", "affordable", "economical", "value", "low-cost", "inexpensive"],
    ),
    (
        Quality::MidRange,
        &["mid-range", "moderate", "decent", "good", "standard", "average"],
    ),
];

pub const USE_CASE_DICTIONARIES: Dictionary<UseCase> = &[
    (
        UseCase::Photography,
        &["camera", "photo", "photography", "pictures", "selfie", "portrait", "video recording"],
    ),
    (
        UseCase::Productivity,
        &["work", "office", "business", "productivity", "professional", "coding", "programming"],
    ),
    (
        UseCase::Entertainment,
        &["gaming", "movies", "music", "streaming", "entertainment", "media", "fun"],
    ),
    (
        UseCase::Fitness,
        &["fitness", "workout", "exercise", "running", "sports", "health", "tracking"],
    ),
    (
        UseCase::Travel,
        &["travel", "portable", "lightweight", "compact", "on-the-go", "mobile"],
    ),
];

static PRICE_CEILING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"under \$?([0-9]+)").expect("price ceiling pattern is valid"));

/// Structured facets derived from one query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetRecord {
    pub intent: Intent,
    pub category: Option<Category>,
    pub quality: Quality,
    pub use_case: Option<UseCase>,
    pub price_ceiling: Option<u32>,
    pub raw_query: String,
}

/// Extract the facet record for `query`. Never fails.
pub fn extract(query: &str) -> FacetRecord {
    let lowered = query.to_lowercase();

    FacetRecord {
        intent: first_match(INTENT_DICTIONARIES, &lowered).unwrap_or(Intent::Search),
        category: first_match(CATEGORY_DICTIONARIES, &lowered),
        quality: first_match(QUALITY_DICTIONARIES, &lowered).unwrap_or(Quality::MidRange),
        use_case: first_match(USE_CASE_DICTIONARIES, &lowered),
        price_ceiling: parse_price_ceiling(&lowered),
        raw_query: query.to_string(),
    }
}

/// Return the first dictionary (in declaration order) with a trigger
/// contained in `haystack`.
fn first_match<T: Copy>(dictionaries: Dictionary<T>, haystack: &str) -> Option<T> {
    dictionaries
        .iter()
        .find(|(_, triggers)| triggers.iter().any(|t| haystack.contains(*t)))
        .map(|(facet, _)| *facet)
}

/// Parse the first `under $N` / `under N` phrase.
///
/// Only the first occurrence is considered; if its digits overflow or
/// are zero the ceiling stays unset.
fn parse_price_ceiling(lowered: &str) -> Option<u32> {
    let caps = PRICE_CEILING.captures(lowered)?;
    caps.get(1)?
        .as_str()
        .parse::<u32>()
        .ok()
        .filter(|n| *n > 0)
}
