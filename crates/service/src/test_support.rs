#![cfg(test)]
use std::path::PathBuf;

use uuid::Uuid;

/// Fresh path under the system temp dir; the file itself is not created.
pub fn temp_path(prefix: &str, file: &str) -> PathBuf {
    std::env::temp_dir()
        .join(format!("{}_{}", prefix, Uuid::new_v4()))
        .join(file)
}

/// Remove the per-test directory created around `temp_path`.
pub async fn cleanup(path: &std::path::Path) {
    if let Some(dir) = path.parent() {
        let _ = tokio::fs::remove_dir_all(dir).await;
    }
}
