use std::{net::SocketAddr, path::Path, sync::Arc};

use axum::Router;
use configs::AppConfig;
use models::{AssetsInventory, EdbOsVersions};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::routes::{self, AppServices};
use service::{records::DatasetService, runtime, upload::UploadService};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(format!("{}:{}", cfg.server.host, cfg.server.port).parse()?)
}

/// Wire the dataset stores and upload ingest described by `cfg` into a router.
pub fn build_app(cfg: &AppConfig) -> anyhow::Result<Router> {
    let data_dir = Path::new(&cfg.storage.data_dir);
    let edb_os = DatasetService::<EdbOsVersions>::open(data_dir.join(&cfg.storage.edb_os_file));
    let assets_inventory = DatasetService::<AssetsInventory>::open(data_dir.join(&cfg.storage.assets_inventory_file));

    let upload = if cfg.upload.enabled {
        Some(Arc::new(UploadService::from_config(&cfg.upload)?))
    } else {
        None
    };

    info!(
        edb_os = %edb_os.store().path().display(),
        assets_inventory = %assets_inventory.store().path().display(),
        upload = upload.is_some(),
        "datasets configured"
    );

    let services = AppServices { edb_os, assets_inventory, upload };
    Ok(routes::build_router(services, build_cors(), cfg.server.static_dir.as_deref()))
}

/// Build the app from `cfg` and serve it until the listener fails.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    runtime::ensure_env(cfg.server.static_dir.as_deref(), &cfg.storage.data_dir).await?;
    if cfg.upload.enabled {
        for dir in UploadService::from_config(&cfg.upload)?.dirs() {
            tokio::fs::create_dir_all(dir).await?;
        }
    }

    let app = build_app(&cfg)?;

    let addr = bind_addr(&cfg)?;
    info!(%addr, "starting server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    // the upload route keys files by the peer address
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;
    Ok(())
}
