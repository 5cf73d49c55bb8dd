//! Collector upload ingest.
//!
//! Collection hosts POST their whole JSON report. The report's `type` picks
//! a destination directory and the sender's IP picks the file name, so each
//! region keeps overwriting its own file.

use std::{
    collections::HashMap,
    net::IpAddr,
    path::PathBuf,
};

use configs::UploadConfig;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::errors::ServiceError;
use crate::storage::fs::{write_json_atomic, UPLOAD_INDENT};

#[derive(Debug, Clone)]
struct UploadTarget {
    dir: PathBuf,
    sources: HashMap<IpAddr, String>,
}

#[derive(Debug, Clone)]
pub struct UploadService {
    default_kind: String,
    kinds: HashMap<String, UploadTarget>,
}

impl UploadService {
    pub fn from_config(cfg: &UploadConfig) -> Result<Self, ServiceError> {
        let mut kinds = HashMap::new();
        for kind in &cfg.kinds {
            let mut sources = HashMap::new();
            for (ip, file) in &kind.sources {
                let ip: IpAddr = ip
                    .parse()
                    .map_err(|_| ServiceError::Validation(format!("invalid source IP {ip:?} for upload kind {}", kind.name)))?;
                sources.insert(ip, file.clone());
            }
            kinds.insert(
                kind.name.to_lowercase(),
                UploadTarget { dir: PathBuf::from(&kind.dir), sources },
            );
        }
        Ok(Self { default_kind: cfg.default_kind.to_lowercase(), kinds })
    }

    /// Directories every configured kind writes into.
    pub fn dirs(&self) -> impl Iterator<Item = &PathBuf> {
        self.kinds.values().map(|t| &t.dir)
    }

    /// Destination for a report of `kind` sent from `sender`. Only a missing
    /// kind means the default; a blank one is unknown.
    pub fn resolve(&self, kind: Option<&str>, sender: IpAddr) -> Result<(String, PathBuf), ServiceError> {
        let kind = kind
            .map(|k| k.trim().to_lowercase())
            .unwrap_or_else(|| self.default_kind.clone());
        let target = self
            .kinds
            .get(&kind)
            .ok_or_else(|| ServiceError::UnknownKind(kind.clone()))?;
        let sender = canonical(sender);
        let file = target.sources.get(&sender).ok_or_else(|| ServiceError::UnmappedSource {
            ip: sender.to_string(),
            kind: kind.clone(),
        })?;
        Ok((kind, target.dir.join(file)))
    }

    /// Validate and write a report. Returns the file it was written to.
    pub async fn store(&self, sender: IpAddr, body: &Value) -> Result<PathBuf, ServiceError> {
        let Some(obj) = body.as_object() else {
            return Err(ServiceError::Validation("expected a JSON object".into()));
        };
        let kind = obj.get("type").and_then(Value::as_str);
        let (kind, path) = match self.resolve(kind, sender) {
            Ok(found) => found,
            Err(e) => {
                warn!(%sender, error = %e, "upload rejected");
                return Err(e);
            }
        };
        if let Err(e) = write_json_atomic(&path, body, UPLOAD_INDENT).await {
            error!(%sender, %kind, path = %path.display(), error = %e, "failed to save upload");
            return Err(e);
        }
        info!(%sender, %kind, path = %path.display(), "saved upload");
        Ok(path)
    }
}

/// IPv4 senders on a dual-stack listener show up as `::ffff:a.b.c.d`.
fn canonical(ip: IpAddr) -> IpAddr {
    match ip {
        IpAddr::V6(v6) => v6.to_ipv4_mapped().map(IpAddr::V4).unwrap_or(IpAddr::V6(v6)),
        v4 => v4,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{cleanup, temp_path};
    use configs::UploadKindConfig;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn service(root: &std::path::Path) -> UploadService {
        let mut sources = BTreeMap::new();
        sources.insert("172.21.195.109".to_string(), "us_cost.json".to_string());
        let mut asset_sources = BTreeMap::new();
        asset_sources.insert("172.21.195.109".to_string(), "us_assets.json".to_string());
        let cfg = UploadConfig {
            enabled: true,
            default_kind: "assets".into(),
            kinds: vec![
                UploadKindConfig {
                    name: "cost".into(),
                    dir: root.join("data").to_string_lossy().to_string(),
                    sources,
                },
                UploadKindConfig {
                    name: "assets".into(),
                    dir: root.join("data_assets").to_string_lossy().to_string(),
                    sources: asset_sources,
                },
            ],
        };
        UploadService::from_config(&cfg).expect("valid config")
    }

    #[tokio::test]
    async fn stores_report_under_sender_file() -> Result<(), anyhow::Error> {
        let marker = temp_path("svc_upload", "root");
        let root = marker.parent().expect("parent").to_path_buf();
        let svc = service(&root);
        let sender: IpAddr = "172.21.195.109".parse()?;

        let body = json!({"type": "COST", "total": 12.5});
        let path = svc.store(sender, &body).await?;
        assert_eq!(path, root.join("data").join("us_cost.json"));
        let raw = tokio::fs::read_to_string(&path).await?;
        assert!(raw.contains("\n    \"total\""));
        assert_eq!(serde_json::from_str::<Value>(&raw)?, body);

        let path = svc.store(sender, &json!({"hosts": []})).await?;
        assert_eq!(path, root.join("data_assets").join("us_assets.json"));

        cleanup(&marker).await;
        Ok(())
    }

    #[test]
    fn unknown_kind_and_sender_are_rejected() -> Result<(), anyhow::Error> {
        let svc = service(std::path::Path::new("/tmp/unused"));
        let known: IpAddr = "172.21.195.109".parse()?;
        let stranger: IpAddr = "192.0.2.1".parse()?;

        assert!(matches!(svc.resolve(Some("billing"), known), Err(ServiceError::UnknownKind(k)) if k == "billing"));
        assert!(matches!(svc.resolve(Some("cost"), stranger), Err(ServiceError::UnmappedSource { .. })));
        assert!(matches!(svc.resolve(Some(""), known), Err(ServiceError::UnknownKind(k)) if k.is_empty()));
        assert!(matches!(svc.resolve(Some("  "), known), Err(ServiceError::UnknownKind(_))));
        Ok(())
    }

    #[test]
    fn mapped_ipv6_sender_matches_ipv4_source() -> Result<(), anyhow::Error> {
        let svc = service(std::path::Path::new("/tmp/unused"));
        let mapped: IpAddr = "::ffff:172.21.195.109".parse()?;
        let (kind, path) = svc.resolve(None, mapped)?;
        assert_eq!(kind, "assets");
        assert!(path.ends_with("us_assets.json"));
        Ok(())
    }

    #[tokio::test]
    async fn non_object_body_is_a_validation_error() -> Result<(), anyhow::Error> {
        let svc = service(std::path::Path::new("/tmp/unused"));
        let err = svc.store("172.21.195.109".parse()?, &json!([1, 2])).await.expect_err("array body");
        assert!(err.is_client_error());
        Ok(())
    }
}
