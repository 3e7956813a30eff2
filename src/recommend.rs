//! Advisory text for a query.
//!
//! Used by both `lens recommend` (CLI) and `POST /recommend` (HTTP server).
//! Needs no store or configuration.

use anyhow::Result;
use serde::Serialize;

use shop_lens_core::aggregate::{validate_query, QueryError};
use shop_lens_core::facets::{self, FacetRecord};
use shop_lens_core::recommend::compose;

#[derive(Debug, Clone, Serialize)]
pub struct RecommendResponse {
    pub recommendation: String,
    pub facets: FacetRecord,
}

pub fn recommend(query: &str) -> Result<RecommendResponse, QueryError> {
    let query = validate_query(query)?;
    let facets = facets::extract(query);
    Ok(RecommendResponse {
        recommendation: compose(&facets),
        facets,
    })
}

/// CLI entry point: prints the advisory, and the facets if asked.
pub fn run_recommend(query: &str, show_facets: bool) -> Result<()> {
    let response = match recommend(query) {
        Ok(r) => r,
        Err(QueryError::Empty) => {
            println!("Please enter your search query");
            return Ok(());
        }
    };

    println!("{}", response.recommendation);

    if show_facets {
        let f = &response.facets;
        println!();
        println!("--- Facets ---");
        println!("intent:        {}", f.intent);
        println!(
            "category:      {}",
            f.category.map(|c| c.as_str()).unwrap_or("-")
        );
        println!("quality:       {}", f.quality);
        println!(
            "use_case:      {}",
            f.use_case.map(|u| u.as_str()).unwrap_or("-")
        );
        match f.price_ceiling {
            Some(n) => println!("price_ceiling: {}", n),
            None => println!("price_ceiling: -"),
        }
    }

    Ok(())
}
