//! Store connectivity and size.

use anyhow::Result;
use serde::Serialize;

use crate::context::AppContext;

/// Response body for `lens status` and `GET /status`.
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub connected: bool,
    pub product_count: i64,
    /// Probe failure reason when disconnected.
    pub error: Option<String>,
}

/// Report the cached connectivity state and the current product count.
///
/// A count failure on a connected store reports 0 rather than erroring.
pub async fn store_status(ctx: &AppContext) -> StatusResponse {
    let product_count = match ctx.store.store() {
        Some(store) => store.count().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to count products");
            0
        }),
        None => 0,
    };

    StatusResponse {
        connected: ctx.store.is_connected(),
        product_count,
        error: ctx.store.unavailable_reason().map(str::to_string),
    }
}

pub async fn run_status(ctx: &AppContext) -> Result<()> {
    let status = store_status(ctx).await;

    if status.connected {
        println!("Store:     connected ({})", ctx.config.db.path.display());
        println!("Products:  {}", status.product_count);
    } else {
        println!("Store:     disconnected, using fallback data");
        if let Some(ref err) = status.error {
            println!("Error:     {}", err);
        }
    }

    Ok(())
}
