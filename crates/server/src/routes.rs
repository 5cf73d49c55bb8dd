use std::{path::Path, sync::Arc};

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;
use service::{records::RecordsApi, upload::UploadService};

pub mod records;
pub mod upload;

/// Collector reports can be much larger than dashboard edits.
const UPLOAD_BODY_LIMIT: usize = 32 * 1024 * 1024;

pub const EDB_OS_PATHS: &[&str] = &["/api/edb-os-versions", "/api/edb-os-backup"];
pub const ASSETS_INVENTORY_PATHS: &[&str] = &["/api/assets-inventory-backup"];

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Everything the router serves.
#[derive(Clone)]
pub struct AppServices {
    pub edb_os: Arc<dyn RecordsApi>,
    pub assets_inventory: Arc<dyn RecordsApi>,
    pub upload: Option<Arc<UploadService>>,
}

/// GET/POST pair for one dataset, mounted at each of `paths`.
pub fn records_router(api: Arc<dyn RecordsApi>, paths: &[&str]) -> Router {
    let mut router: Router<Arc<dyn RecordsApi>> = Router::new();
    for path in paths {
        router = router.route(path, get(records::get_records).post(records::post_records));
    }
    router.with_state(api)
}

/// Build the full application router: datasets, optional upload ingest and static files
pub fn build_router(services: AppServices, cors: CorsLayer, static_dir: Option<&str>) -> Router {
    let mut app = Router::new()
        .route("/health", get(health))
        .merge(records_router(services.edb_os, EDB_OS_PATHS))
        .merge(records_router(services.assets_inventory, ASSETS_INVENTORY_PATHS));

    if let Some(upload_svc) = services.upload {
        let ingest = Router::new()
            .route("/upload", post(upload::upload))
            .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
            .with_state(upload_svc);
        app = app.merge(ingest);
    }

    if let Some(dir) = static_dir {
        let index = Path::new(dir).join("index.html");
        app = app.fallback_service(ServeDir::new(dir).fallback(ServeFile::new(index)));
    }

    app.layer(cors).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
            .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
    )
}
