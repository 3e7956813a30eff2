//! # Shop Lens Core
//!
//! Shared logic for Shop Lens: query facet extraction, recommendation text,
//! currency normalization, synthetic price sampling, the product store
//! abstraction, and result aggregation.
//!
//! This crate contains no tokio, sqlx, filesystem I/O, or other
//! native-only dependencies. Everything process-wide (rate table, price
//! tiers, synthetic sources, store handle) is passed in explicitly.

pub mod aggregate;
pub mod currency;
pub mod facets;
pub mod fallback;
pub mod models;
pub mod pricing;
pub mod recommend;
pub mod sources;
pub mod store;
