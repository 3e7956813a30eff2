//! Recent search audit records.

use anyhow::{bail, Result};

use shop_lens_core::models::SearchRecord;
use shop_lens_core::store::StoreHandle;

/// Newest records first, at most `limit`.
pub async fn recent_searches(handle: &StoreHandle, limit: usize) -> Result<Vec<SearchRecord>> {
    match handle.store() {
        Some(store) => store.recent_searches(limit).await,
        None => bail!(
            "store unavailable: {}",
            handle.unavailable_reason().unwrap_or("unknown")
        ),
    }
}

pub async fn run_history(handle: &StoreHandle, limit: usize) -> Result<()> {
    let records = recent_searches(handle, limit).await?;

    if records.is_empty() {
        println!("No searches recorded.");
        return Ok(());
    }

    println!("  {:<40} {:>8}   {}", "QUERY", "RESULTS", "WHEN");
    println!("  {}", "-".repeat(64));
    for r in &records {
        println!(
            "  {:<40} {:>8}   {}",
            r.query,
            r.results_count,
            format_ts_relative(r.searched_at)
        );
    }

    Ok(())
}

/// Format a Unix timestamp as a relative time string (e.g. "3 hours ago").
fn format_ts_relative(ts: i64) -> String {
    let now = chrono::Utc::now().timestamp();
    let delta = now - ts;

    if delta < 0 {
        return format_ts_iso(ts);
    }

    if delta < 60 {
        "just now".to_string()
    } else if delta < 3600 {
        let mins = delta / 60;
        format!("{} min{} ago", mins, if mins == 1 { "" } else { "s" })
    } else if delta < 86400 {
        let hours = delta / 3600;
        format!("{} hour{} ago", hours, if hours == 1 { "" } else { "s" })
    } else if delta < 86400 * 30 {
        let days = delta / 86400;
        format!("{} day{} ago", days, if days == 1 { "" } else { "s" })
    } else {
        format_ts_iso(ts)
    }
}

fn format_ts_iso(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| ts.to_string())
}
