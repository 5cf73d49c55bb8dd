use std::{collections::BTreeMap, net::SocketAddr, path::PathBuf};

use axum::body::Body;
use axum::extract::connect_info::MockConnectInfo;
use axum::http::{Request, StatusCode};
use axum::Router;
use configs::{AppConfig, UploadKindConfig};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

struct TestApp {
    app: Router,
    root: PathBuf,
}

impl TestApp {
    fn data_file(&self, name: &str) -> PathBuf {
        self.root.join("data_backup").join(name)
    }
}

fn test_config(root: &std::path::Path) -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.storage.data_dir = root.join("data_backup").to_string_lossy().to_string();
    cfg.upload.enabled = true;
    cfg.upload.kinds = vec![UploadKindConfig {
        name: "cost".into(),
        dir: root.join("data").to_string_lossy().to_string(),
        sources: BTreeMap::from([("172.21.195.109".to_string(), "us_cost.json".to_string())]),
    }];
    cfg
}

fn build(cfg: AppConfig, root: PathBuf) -> anyhow::Result<TestApp> {
    let app = server::build_app(&cfg)?
        .layer(MockConnectInfo(SocketAddr::from(([172, 21, 195, 109], 40000))));
    Ok(TestApp { app, root })
}

fn start() -> anyhow::Result<TestApp> {
    let root = std::env::temp_dir().join(format!("server_api_{}", Uuid::new_v4()));
    build(test_config(&root), root)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> anyhow::Result<(StatusCode, Value)> {
    let req = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(raw) => req.header("content-type", "application/json").body(Body::from(raw.to_string()))?,
        None => req.body(Body::empty())?,
    };
    let resp = app.clone().oneshot(req).await?;
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
    Ok((status, value))
}

async fn post_json(app: &Router, uri: &str, body: Value) -> anyhow::Result<(StatusCode, Value)> {
    send(app, "POST", uri, Some(&body.to_string())).await
}

async fn cleanup(t: &TestApp) {
    let _ = tokio::fs::remove_dir_all(&t.root).await;
}

#[tokio::test]
async fn health_is_ok() -> anyhow::Result<()> {
    let t = start()?;
    let (status, body) = send(&t.app, "GET", "/health", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn fresh_install_reads_empty_map() -> anyhow::Result<()> {
    let t = start()?;
    for path in ["/api/edb-os-versions", "/api/edb-os-backup", "/api/assets-inventory-backup"] {
        let (status, body) = send(&t.app, "GET", path, None).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({}));
    }
    cleanup(&t).await;
    Ok(())
}

#[tokio::test]
async fn post_then_get_returns_full_record() -> anyhow::Result<()> {
    let t = start()?;
    let (status, body) = post_json(
        &t.app,
        "/api/edb-os-versions",
        json!({"ip": "10.0.0.1", "values": {"skip": "Yes", "reason_for_skip": "maintenance window"}}),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true}));

    let (_, body) = send(&t.app, "GET", "/api/edb-os-versions", None).await?;
    assert_eq!(
        body,
        json!({"10.0.0.1": {
            "release_date": "",
            "last_applied_date": "",
            "next_update": "",
            "skip": "Yes",
            "reason_for_skip": "maintenance window",
            "upgrade_history": "",
            "upgrade_notes": ""
        }})
    );

    // same document behind the legacy path
    let (_, legacy) = send(&t.app, "GET", "/api/edb-os-backup", None).await?;
    assert_eq!(legacy, body);
    cleanup(&t).await;
    Ok(())
}

#[tokio::test]
async fn batch_post_applies_in_order() -> anyhow::Result<()> {
    let t = start()?;
    let (status, _) = post_json(
        &t.app,
        "/api/edb-os-versions",
        json!({"batch": [{"ip": "a", "values": {"skip": "No"}}, {"ip": "a", "values": {"skip": "Yes"}}]}),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    let stored: Value = serde_json::from_slice(&tokio::fs::read(t.data_file("edb_os_versions_backup.json")).await?)?;
    assert_eq!(stored, json!({"type": "os_edb_backup", "records": [{"ip": "a", "skip": "Yes"}]}));
    cleanup(&t).await;
    Ok(())
}

#[tokio::test]
async fn extraneous_fields_never_reach_the_file() -> anyhow::Result<()> {
    let t = start()?;
    post_json(
        &t.app,
        "/api/assets-inventory-backup",
        json!({"ip": "172.20.0.4", "values": {"asset_owner": "Platform", "foo": "bar"}}),
    )
    .await?;

    let raw = tokio::fs::read_to_string(t.data_file("assets_inventory.json")).await?;
    assert!(!raw.contains("foo"));
    let (_, body) = send(&t.app, "GET", "/api/assets-inventory-backup", None).await?;
    assert_eq!(
        body,
        json!({"172.20.0.4": {
            "asset_custodian": "",
            "asset_owner": "Platform",
            "risk_owner": "",
            "asset_classification": "",
            "data_classification": ""
        }})
    );
    cleanup(&t).await;
    Ok(())
}

#[tokio::test]
async fn malformed_entries_still_answer_ok() -> anyhow::Result<()> {
    let t = start()?;
    for body in [json!({}), json!({"ip": "x"}), json!({"values": {"skip": "Yes"}}), json!({"ip": "x", "values": 3})] {
        let (status, reply) = post_json(&t.app, "/api/edb-os-versions", body).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reply, json!({"ok": true}));
    }
    let (_, body) = send(&t.app, "GET", "/api/edb-os-versions", None).await?;
    assert_eq!(body, json!({}));
    cleanup(&t).await;
    Ok(())
}

#[tokio::test]
async fn invalid_json_is_rejected() -> anyhow::Result<()> {
    let t = start()?;
    let (status, body) = send(&t.app, "POST", "/api/edb-os-versions", Some("{not json")).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"ok": false, "error": "Invalid JSON"}));
    cleanup(&t).await;
    Ok(())
}

#[tokio::test]
async fn write_failure_is_a_500() -> anyhow::Result<()> {
    let root = std::env::temp_dir().join(format!("server_api_{}", Uuid::new_v4()));
    tokio::fs::create_dir_all(&root).await?;
    tokio::fs::write(root.join("blocker"), b"not a directory").await?;
    let mut cfg = test_config(&root);
    cfg.storage.data_dir = root.join("blocker").join("data_backup").to_string_lossy().to_string();
    let t = build(cfg, root)?;

    let (status, body) = post_json(&t.app, "/api/edb-os-versions", json!({"ip": "a", "values": {"skip": "No"}})).await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"ok": false, "error": "Failed to persist data"}));

    let (status, body) = send(&t.app, "GET", "/api/edb-os-versions", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({}));
    cleanup(&t).await;
    Ok(())
}

#[tokio::test]
async fn upload_is_routed_by_type_and_sender() -> anyhow::Result<()> {
    let t = start()?;
    let report = json!({"type": "cost", "total": 1042.17, "services": {"ec2": 800.0}});
    let (status, body) = post_json(&t.app, "/upload", report.clone()).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "success", "message": "Data saved for 172.21.195.109"}));

    let saved: Value = serde_json::from_slice(&tokio::fs::read(t.root.join("data").join("us_cost.json")).await?)?;
    assert_eq!(saved, report);
    cleanup(&t).await;
    Ok(())
}

#[tokio::test]
async fn upload_rejects_unknown_type_and_bad_json() -> anyhow::Result<()> {
    let t = start()?;
    let (status, body) = post_json(&t.app, "/upload", json!({"type": "billing"})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");

    // default type is "assets", which this config does not declare
    let (status, _) = post_json(&t.app, "/upload", json!({"hosts": []})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&t.app, "POST", "/upload", Some("[[")).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid JSON");
    cleanup(&t).await;
    Ok(())
}

#[tokio::test]
async fn upload_route_absent_when_disabled() -> anyhow::Result<()> {
    let root = std::env::temp_dir().join(format!("server_api_{}", Uuid::new_v4()));
    let mut cfg = test_config(&root);
    cfg.upload.enabled = false;
    let t = build(cfg, root)?;
    let (status, _) = post_json(&t.app, "/upload", json!({"type": "cost"})).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn static_dir_serves_dashboard_with_spa_fallback() -> anyhow::Result<()> {
    let root = std::env::temp_dir().join(format!("server_api_{}", Uuid::new_v4()));
    let static_dir = root.join("frontend");
    tokio::fs::create_dir_all(&static_dir).await?;
    tokio::fs::write(static_dir.join("index.html"), "<html>dashboard</html>").await?;

    let mut cfg = test_config(&root);
    cfg.server.static_dir = Some(static_dir.to_string_lossy().to_string());
    let t = build(cfg, root)?;

    let req = Request::builder().uri("/assets/inventory").body(Body::empty())?;
    let resp = t.app.clone().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    assert_eq!(&bytes[..], b"<html>dashboard</html>");

    // API routes still win over the fallback
    let (status, body) = send(&t.app, "GET", "/api/edb-os-versions", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({}));
    cleanup(&t).await;
    Ok(())
}
