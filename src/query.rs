//! The search pipeline: facets → aggregation → listings.
//!
//! Used by both `lens search` (CLI) and `POST /search` (HTTP server).

use anyhow::Result;
use serde::Serialize;

use shop_lens_core::aggregate::{validate_query, AuditOutcome, QueryError, StoreOutcome};
use shop_lens_core::facets::{self, FacetRecord};
use shop_lens_core::models::Listing;

use crate::context::AppContext;

/// Structured response for one query.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub currency: String,
    pub facets: FacetRecord,
    pub listings: Vec<Listing>,
    pub store: StoreOutcome,
    pub audit: AuditOutcome,
}

/// Core search function returning structured data (used by CLI and server).
///
/// `currency` defaults to `[search].default_currency`. Unknown codes are
/// not rejected; their prices display in the base unit.
pub async fn search_listings(
    ctx: &AppContext,
    query: &str,
    currency: Option<&str>,
) -> Result<SearchResponse, QueryError> {
    let query = validate_query(query)?;
    let currency = currency
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(ctx.config.search.default_currency.as_str());

    let facets = facets::extract(query);
    let aggregation = ctx
        .aggregator()
        .aggregate(&ctx.store, query, &facets, currency)
        .await;

    tracing::debug!(
        query,
        currency,
        listings = aggregation.listings.len(),
        authoritative = aggregation.authoritative_count(),
        "search complete"
    );

    Ok(SearchResponse {
        query: query.to_string(),
        currency: currency.to_string(),
        facets,
        listings: aggregation.listings,
        store: aggregation.store,
        audit: aggregation.audit,
    })
}

/// CLI entry point: calls [`search_listings`] and prints to stdout.
pub async fn run_search(
    ctx: &AppContext,
    query: &str,
    currency: Option<String>,
    json: bool,
) -> Result<()> {
    let response = match search_listings(ctx, query, currency.as_deref()).await {
        Ok(r) => r,
        Err(QueryError::Empty) => {
            println!("Please enter a search term");
            return Ok(());
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    if let StoreOutcome::Degraded { ref reason } = response.store {
        eprintln!("Warning: store search failed: {}", reason);
    }

    for (i, listing) in response.listings.iter().enumerate() {
        let tag = if listing.is_authoritative { "*" } else { " " };
        println!(
            "{}.{} {} - {}",
            i + 1,
            tag,
            listing.title,
            listing.price_display
        );
        println!("    source: {}", listing.source_label);
        println!("    {}", listing.description);
        println!("    url: {}", listing.link);
        println!();
    }

    Ok(())
}
