//! SQLite-backed [`ProductStore`] implementation.
//!
//! Maps each [`ProductStore`] operation onto the `products` and
//! `search_history` tables created by `lens init`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqliteConnection, SqlitePool};

use shop_lens_core::models::{NewProduct, Product, SearchRecord};
use shop_lens_core::store::{ProductStore, SeedOutcome};

use crate::config::Config;
use crate::db;
use crate::migrate;

/// SQLite implementation of the [`ProductStore`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open the configured database and check that the schema is present.
    ///
    /// Fails if the database file does not exist or `lens init` has not
    /// been run. Never creates anything.
    pub async fn probe(config: &Config) -> Result<Self> {
        let pool = db::connect_existing(config).await?;
        let _: i64 = sqlx::query_scalar("SELECT COUNT(search_text) FROM products")
            .fetch_one(&pool)
            .await
            .context("products table missing or outdated (run `lens init`)")?;
        let _: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM search_history")
            .fetch_one(&pool)
            .await
            .context("search_history table missing (run `lens init`)")?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// `%query%` with LIKE wildcards in `query` escaped by `\`.
fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for ch in query.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

async fn insert_product(conn: &mut SqliteConnection, product: &NewProduct) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO products (name, description, category, quality, price, search_text, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&product.title)
    .bind(&product.description)
    .bind(&product.category)
    .bind(&product.quality)
    .bind(product.price)
    .bind(product.search_text())
    .bind(chrono::Utc::now().timestamp())
    .execute(&mut *conn)
    .await?;
    Ok(())
}

#[async_trait]
impl ProductStore for SqliteStore {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Product>> {
        // search_text is folded in Rust; LIKE alone only folds ASCII.
        let pattern = like_pattern(&query.to_lowercase());
        let rows = sqlx::query(
            r#"
            SELECT name, description, price, category
            FROM products
            WHERE search_text LIKE ? ESCAPE '\'
            ORDER BY seq ASC
            LIMIT ?
            "#,
        )
        .bind(&pattern)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| Product {
                title: row.get("name"),
                description: row.get("description"),
                price: row.get("price"),
                category: row.get("category"),
            })
            .collect())
    }

    async fn insert(&self, product: &NewProduct) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        insert_product(&mut conn, product).await
    }

    async fn seed_if_empty(&self, products: &[NewProduct]) -> Result<SeedOutcome> {
        // IMMEDIATE takes the write lock before the count, so a second
        // seeder waits here and then sees the committed rows.
        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;

        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&mut *tx)
            .await?;
        if existing > 0 {
            tx.rollback().await?;
            return Ok(SeedOutcome::AlreadyPopulated(existing));
        }

        for product in products {
            insert_product(&mut tx, product).await?;
        }
        tx.commit().await?;
        Ok(SeedOutcome::Inserted(products.len()))
    }

    async fn count(&self) -> Result<i64> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }

    async fn audit(&self, query: &str, results_count: i64) -> Result<()> {
        sqlx::query(
            "INSERT INTO search_history (query, results_count, searched_at) VALUES (?, ?, ?)",
        )
        .bind(query)
        .bind(results_count)
        .bind(chrono::Utc::now().timestamp())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn recent_searches(&self, limit: usize) -> Result<Vec<SearchRecord>> {
        let rows = sqlx::query(
            "SELECT query, results_count, searched_at FROM search_history ORDER BY id DESC LIMIT ?",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| SearchRecord {
                query: row.get("query"),
                results_count: row.get("results_count"),
                searched_at: row.get("searched_at"),
            })
            .collect())
    }

    async fn ensure_indexes(&self) -> Result<()> {
        migrate::create_indexes(&self.pool).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DbConfig, PricingConfig, SearchConfig, ServerConfig};
    use crate::seed::{sample_catalog, seed};
    use std::collections::HashMap;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn config_in(tmp: &TempDir) -> Config {
        Config {
            db: DbConfig {
                path: tmp.path().join("lens.sqlite"),
            },
            server: ServerConfig {
                bind: "127.0.0.1:0".to_string(),
            },
            search: SearchConfig::default(),
            pricing: PricingConfig::default(),
            currencies: HashMap::new(),
            sources: Vec::new(),
        }
    }

    async fn migrated_store(tmp: &TempDir) -> SqliteStore {
        let cfg = config_in(tmp);
        migrate::run_migrations(&cfg).await.unwrap();
        SqliteStore::probe(&cfg).await.unwrap()
    }

    fn product(title: &str, description: &str) -> NewProduct {
        NewProduct {
            title: title.to_string(),
            description: description.to_string(),
            category: Some("computer".to_string()),
            quality: None,
            price: 249.0,
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_seed_inserts_catalog_once() {
        let tmp = TempDir::new().unwrap();
        let store = Arc::new(migrated_store(&tmp).await);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { seed(store.as_ref(), &sample_catalog()).await.unwrap() })
            })
            .collect();

        let mut outcomes = Vec::new();
        for h in handles {
            outcomes.push(h.await.unwrap());
        }

        assert_eq!(store.count().await.unwrap(), 5);
        assert_eq!(
            outcomes
                .iter()
                .filter(|o| **o == SeedOutcome::Inserted(5))
                .count(),
            1
        );
        assert!(outcomes
            .iter()
            .all(|o| matches!(o, SeedOutcome::Inserted(5) | SeedOutcome::AlreadyPopulated(5))));
    }

    #[tokio::test]
    async fn test_seed_if_empty_leaves_populated_store_alone() {
        let tmp = TempDir::new().unwrap();
        let store = migrated_store(&tmp).await;
        store.insert(&product("Existing", "already here")).await.unwrap();

        let outcome = store.seed_if_empty(&sample_catalog()).await.unwrap();
        assert_eq!(outcome, SeedOutcome::AlreadyPopulated(1));
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_search_folds_non_ascii_case() {
        let tmp = TempDir::new().unwrap();
        let store = migrated_store(&tmp).await;
        store.insert(&product("Écran Pro", "Moniteur 27 pouces")).await.unwrap();
        store.insert(&product("Laptop", "Plain ASCII")).await.unwrap();

        for query in ["écran", "ÉCRAN", "Écran pro"] {
            let hits = store.search(query, 15).await.unwrap();
            assert_eq!(hits.len(), 1, "query {:?}", query);
            assert_eq!(hits[0].title, "Écran Pro");
        }
        assert_eq!(store.search("ascii", 15).await.unwrap().len(), 1);
        assert_eq!(store.search("computer", 15).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_search_does_not_match_across_fields() {
        let tmp = TempDir::new().unwrap();
        let store = migrated_store(&tmp).await;
        store.insert(&product("Pro", "Max")).await.unwrap();
        assert!(store.search("promax", 15).await.unwrap().is_empty());
        assert_eq!(store.search("max", 15).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_init_backfills_search_text() {
        let tmp = TempDir::new().unwrap();
        let cfg = config_in(&tmp);

        // A products table from before search_text existed.
        let pool = db::connect(&cfg).await.unwrap();
        sqlx::query(
            r#"
            CREATE TABLE products (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                category TEXT,
                quality TEXT,
                price REAL NOT NULL,
                created_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO products (name, description, category, price, created_at) \
             VALUES ('Écran Pro', 'Moniteur', 'computer', 249.0, 0)",
        )
        .execute(&pool)
        .await
        .unwrap();
        pool.close().await;

        migrate::run_migrations(&cfg).await.unwrap();
        let store = SqliteStore::probe(&cfg).await.unwrap();
        let hits = store.search("écran", 15).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].price, 249.0);
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("phone"), "%phone%");
        assert_eq!(like_pattern("100%_off"), "%100\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }
}
