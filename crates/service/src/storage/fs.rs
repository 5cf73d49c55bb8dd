use std::path::Path;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tokio::fs;
use uuid::Uuid;

use crate::errors::ServiceError;

/// Two-space indent used for annotation documents.
pub const DOCUMENT_INDENT: &[u8] = b"  ";
/// Four-space indent used for collector uploads.
pub const UPLOAD_INDENT: &[u8] = b"    ";

/// Serialize `value` as pretty JSON and replace `path` with it.
///
/// The parent directory is created if needed. Content goes to a sibling
/// temp file first and is renamed over the target, so readers never see a
/// half-written file.
pub async fn write_json_atomic<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
    indent: &[u8],
) -> Result<(), ServiceError> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(indent));
    value
        .serialize(&mut ser)
        .map_err(|e| ServiceError::Serialization(e.to_string()))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| ServiceError::storage(parent, e))?;
    }

    let file_name = path
        .file_name()
        .ok_or_else(|| ServiceError::storage(path, "path has no file name"))?
        .to_string_lossy();
    let tmp = path.with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4().simple()));

    let replaced = match fs::write(&tmp, &buf).await {
        Ok(()) => fs::rename(&tmp, path).await.map_err(|e| ServiceError::storage(path, e)),
        Err(e) => Err(ServiceError::storage(&tmp, e)),
    };
    if replaced.is_err() {
        // a short write leaves a partial temp file behind too
        let _ = fs::remove_file(&tmp).await;
    }
    replaced
}
