//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use tracing::warn;

/// Ensure the data directory exists; warn when the optional static directory is missing.
pub async fn ensure_env(static_dir: Option<&str>, data_dir: &str) -> anyhow::Result<()> {
    if let Some(static_dir) = static_dir {
        if tokio::fs::metadata(static_dir).await.is_err() {
            warn!(%static_dir, "static assets directory not found; dashboard pages may 404");
        }
    }
    tokio::fs::create_dir_all(data_dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {data_dir}: {e}"))?;
    Ok(())
}
