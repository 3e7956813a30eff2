use anyhow::Result;
use sqlx::{Row, SqlitePool};

use shop_lens_core::models::search_text;

use crate::config::Config;
use crate::db;

pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;

    // Create products table; `seq` preserves insertion order for search
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS products (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            category TEXT,
            quality TEXT,
            price REAL NOT NULL,
            search_text TEXT NOT NULL DEFAULT '',
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(&pool)
    .await?;

    add_search_text(&pool).await?;

    // Create search audit table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS search_history (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            query TEXT NOT NULL,
            results_count INTEGER NOT NULL,
            searched_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(&pool)
    .await?;

    create_indexes(&pool).await?;

    pool.close().await;
    Ok(())
}

/// Add and backfill `products.search_text` on databases created before it
/// existed.
async fn add_search_text(pool: &SqlitePool) -> Result<()> {
    let columns: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM pragma_table_info('products') WHERE name = 'search_text'",
    )
    .fetch_one(pool)
    .await?;
    if columns == 0 {
        sqlx::query("ALTER TABLE products ADD COLUMN search_text TEXT NOT NULL DEFAULT ''")
            .execute(pool)
            .await?;
    }

    let rows = sqlx::query(
        "SELECT seq, name, description, category FROM products WHERE search_text = ''",
    )
    .fetch_all(pool)
    .await?;
    for row in &rows {
        let text = search_text(
            row.get::<String, _>("name").as_str(),
            row.get::<String, _>("description").as_str(),
            row.get::<Option<String>, _>("category").as_deref(),
        );
        sqlx::query("UPDATE products SET search_text = ? WHERE seq = ?")
            .bind(text)
            .bind(row.get::<i64, _>("seq"))
            .execute(pool)
            .await?;
    }
    if !rows.is_empty() {
        tracing::info!(rows = rows.len(), "backfilled product search text");
    }
    Ok(())
}

/// Create lookup indexes. Idempotent.
pub async fn create_indexes(pool: &SqlitePool) -> Result<()> {
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_products_name ON products(name)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_products_category ON products(category)")
        .execute(pool)
        .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_search_history_searched_at ON search_history(searched_at DESC)",
    )
    .execute(pool)
    .await?;
    Ok(())
}
