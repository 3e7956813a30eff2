//! # Shop Lens
//!
//! A rule-based shopping query engine. Free-text queries are classified into
//! facets (intent, category, quality, use case, price ceiling), answered with
//! listings from a product store plus synthetic external sources, and priced
//! in the requested currency.
//!
//! ## Architecture
//!
//! ```text
//!   query ──▶ ┌──────────┐ ──▶ ┌────────────┐ ──▶ advisory text
//!             │  Facets  │     │ Recommend  │
//!             └────┬─────┘     └────────────┘
//!                  ▼
//!             ┌────────────┐   ┌──────────┐
//!             │ Aggregator │◀──│  SQLite  │  (or fallback catalog)
//!             └────┬───────┘   └──────────┘
//!                  ▼
//!             currency normalization ──▶ listings
//!                  │
//!        ┌─────────┴─────────┐
//!        ▼                   ▼
//!   ┌──────────┐       ┌──────────┐
//!   │   CLI    │       │   HTTP   │
//!   │  (lens)  │       │  (JSON)  │
//!   └──────────┘       └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! lens init                          # create database
//! lens seed                          # insert the sample catalog
//! lens search "cheap laptop" --currency EUR
//! lens recommend "recommend a phone under $500"
//! lens serve                         # start HTTP server
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`context`] | Process-wide tables and store handle |
//! | [`query`] | Search pipeline |
//! | [`recommend`] | Advisory text |
//! | [`status`] | Store connectivity report |
//! | [`seed`] | Sample catalog bootstrap |
//! | [`history`] | Search audit records |
//! | [`sqlite_store`] | SQLite product store |
//! | [`server`] | JSON HTTP server |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |

pub mod config;
pub mod context;
pub mod db;
pub mod history;
pub mod logging;
pub mod migrate;
pub mod query;
pub mod recommend;
pub mod seed;
pub mod server;
pub mod sqlite_store;
pub mod status;
