use std::{net::SocketAddr, sync::Arc};

use axum::{
    body::Bytes,
    extract::{ConnectInfo, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use service::upload::UploadService;
use tracing::info;

use super::records::parse_body;

fn reply(status: StatusCode, outcome: &str, message: impl Into<String>) -> (StatusCode, Json<Value>) {
    (status, Json(json!({"status": outcome, "message": message.into()})))
}

/// POST /upload: store a collector report under the sender's file.
pub async fn upload(
    State(svc): State<Arc<UploadService>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    let sender = addr.ip();
    info!(%sender, bytes = body.len(), "received upload");

    let body = match parse_body(&body) {
        Ok(v) => v,
        Err(_) => return reply(StatusCode::BAD_REQUEST, "error", "Invalid JSON"),
    };
    match svc.store(sender, &body).await {
        Ok(_) => reply(StatusCode::OK, "success", format!("Data saved for {sender}")),
        Err(e) if e.is_client_error() => reply(StatusCode::BAD_REQUEST, "error", e.to_string()),
        Err(_) => reply(StatusCode::INTERNAL_SERVER_ERROR, "error", "Failed to save data"),
    }
}
