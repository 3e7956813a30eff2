//! Short advisory text for a facet record.
//!
//! The message never constrains what aggregation returns; it is derived
//! from the same facets independently.

use crate::facets::{FacetRecord, Intent, Quality};

fn opening(intent: Intent) -> &'static str {
    match intent {
        Intent::Recommendation => "**Based on your request, here are my top recommendations:**",
        Intent::Comparison => "**Here's what I found for comparison:**",
        Intent::Search | Intent::Purchase => "**Semantic Analysis Results:**",
    }
}

fn quality_advice(quality: Quality) -> &'static str {
    match quality {
        Quality::PremiumQuality => {
            "**Premium Choice**: Expect top-tier performance, build quality, and latest features"
        }
        Quality::BudgetFriendly => {
            "**Budget Smart**: Great value options that don't compromise on essentials"
        }
        Quality::MidRange => "**Balanced Option**: Perfect mix of features and affordability",
    }
}

/// Compose the advisory: opening line, quality line, then an optional
/// price-ceiling line, separated by newlines.
pub fn compose(facets: &FacetRecord) -> String {
    let mut lines = vec![
        opening(facets.intent).to_string(),
        quality_advice(facets.quality).to_string(),
    ];

    if let Some(ceiling) = facets.price_ceiling {
        lines.push(format!(
            "**Budget Constraint**: Under ${} - I'll prioritize value and essential features",
            ceiling
        ));
    }

    lines.join("\n")
}
