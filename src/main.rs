//! # Shop Lens CLI (`lens`)
//!
//! ## Usage
//!
//! ```bash
//! lens --config ./config/lens.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `lens init` | Create the SQLite database and run schema migrations |
//! | `lens seed` | Insert the sample catalog if the store is empty |
//! | `lens status` | Show store connectivity and product count |
//! | `lens search "<query>"` | Search and print listings |
//! | `lens recommend "<query>"` | Print advisory text for a query |
//! | `lens history` | Show recent searches |
//! | `lens serve` | Start the JSON HTTP server |

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use shop_lens::{config, context, history, logging, migrate, query, recommend, seed, server, status};

/// Shop Lens CLI: rule-based shopping search with currency normalization.
#[derive(Parser)]
#[command(
    name = "lens",
    about = "Shop Lens: rule-based shopping search with currency normalization",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/lens.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and the products and
    /// search_history tables. Safe to run repeatedly.
    Init,

    /// Insert the sample catalog if the store is empty.
    Seed,

    /// Show store connectivity and product count.
    Status,

    /// Search for products.
    ///
    /// Prints store (or fallback) matches first, marked with `*`, followed
    /// by one synthetic listing per external source.
    Search {
        /// The search query string.
        query: String,

        /// Currency code for prices (e.g. `EUR`, `JPY`). Defaults to
        /// `[search].default_currency`.
        #[arg(long)]
        currency: Option<String>,

        /// Print the full response as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print advisory text for a query.
    ///
    /// Does not need a config file or database.
    Recommend {
        /// The search query string.
        query: String,

        /// Also print the extracted facets.
        #[arg(long)]
        facets: bool,
    },

    /// Show recent searches.
    History {
        /// Maximum number of records to show.
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Start the JSON HTTP server on `[server].bind`.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();
    let cli = Cli::parse();

    // Commands that don't require config
    if let Commands::Recommend { query, facets } = &cli.command {
        recommend::run_recommend(query, *facets)?;
        return Ok(());
    }

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Seed => {
            let ctx = context::AppContext::connect(&cfg).await?;
            seed::run_seed(&ctx.store).await?;
        }
        Commands::Status => {
            let ctx = context::AppContext::connect(&cfg).await?;
            status::run_status(&ctx).await?;
        }
        Commands::Search {
            query,
            currency,
            json,
        } => {
            let ctx = context::AppContext::connect(&cfg).await?;
            query::run_search(&ctx, &query, currency, json).await?;
        }
        Commands::History { limit } => {
            let ctx = context::AppContext::connect(&cfg).await?;
            history::run_history(&ctx.store, limit).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Recommend { .. } => {
            // Handled above (before config loading)
            unreachable!()
        }
    }

    Ok(())
}
