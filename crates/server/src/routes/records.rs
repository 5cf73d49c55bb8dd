use std::sync::Arc;

use axum::{body::Bytes, extract::State, Json};
use serde_json::{json, Map, Value};
use service::records::RecordsApi;
use tracing::debug;

use crate::errors::ApiError;

/// GET: `ip -> record` with every field of the dataset present.
pub async fn get_records(State(api): State<Arc<dyn RecordsApi>>) -> Json<Value> {
    Json(api.snapshot().await)
}

/// POST: `{ ip, values }` or `{ batch: [{ ip, values }, ...] }`.
/// Bad entries are skipped; only an unparsable body or a failed write is an error.
pub async fn post_records(
    State(api): State<Arc<dyn RecordsApi>>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let body = parse_body(&body)?;
    let summary = api.upsert(&body).await?;
    debug!(dataset = api.name(), created = summary.created, updated = summary.updated, "upsert applied");
    Ok(Json(json!({"ok": true})))
}

/// Empty body reads as `{}`.
pub(crate) fn parse_body(raw: &[u8]) -> Result<Value, ApiError> {
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_slice(raw).map_err(|_| ApiError::invalid_json())
}
