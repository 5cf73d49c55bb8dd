use std::collections::{BTreeMap, HashSet};
use std::net::IpAddr;

use anyhow::{anyhow, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub upload: UploadConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
    /// Dashboard build directory served as static files, if any.
    #[serde(default)]
    pub static_dir: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 5153, worker_threads: Some(4), static_dir: None }
    }
}

/// Where the annotation documents live.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_edb_os_file")]
    pub edb_os_file: String,
    #[serde(default = "default_assets_inventory_file")]
    pub assets_inventory_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            edb_os_file: default_edb_os_file(),
            assets_inventory_file: default_assets_inventory_file(),
        }
    }
}

fn default_data_dir() -> String { "public/data_backup".into() }
fn default_edb_os_file() -> String { "edb_os_versions_backup.json".into() }
fn default_assets_inventory_file() -> String { "assets_inventory.json".into() }
fn default_upload_kind() -> String { "assets".into() }

/// Collector upload listener: `type` picks a kind, the sender IP picks the file.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_upload_kind")]
    pub default_kind: String,
    #[serde(default)]
    pub kinds: Vec<UploadKindConfig>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self { enabled: false, default_kind: default_upload_kind(), kinds: Vec::new() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadKindConfig {
    pub name: String,
    pub dir: String,
    /// sender IP -> file name inside `dir`
    #[serde(default)]
    pub sources: BTreeMap<String, String>,
}

pub fn load_from_str(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Config file if present, otherwise defaults overlaid with environment
    /// variables. A file that exists but does not parse is an error.
    pub fn load_or_env() -> Result<Self> {
        let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        Self::load_or_env_from(&path)
    }

    pub fn load_or_env_from(path: &str) -> Result<Self> {
        let mut cfg = match std::fs::read_to_string(path) {
            Ok(content) => load_from_str(&content).map_err(|e| anyhow!("invalid config {path}: {e}"))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let mut cfg = AppConfig::default();
                cfg.apply_env();
                cfg
            }
            Err(e) => return Err(anyhow!("cannot read config {path}: {e}")),
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    fn apply_env(&mut self) {
        if let Ok(host) = std::env::var("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            self.server.port = port;
        }
        if let Some(w) = std::env::var("TOKIO_WORKER_THREADS").ok().and_then(|v| v.parse::<usize>().ok()) {
            self.server.worker_threads = Some(w);
        }
        if let Ok(dir) = std::env::var("DATA_DIR") {
            self.storage.data_dir = dir;
        }
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.storage.validate()?;
        self.upload.normalize_and_validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        match self.worker_threads {
            Some(w) if w > 0 => {}
            _ => self.worker_threads = Some(4),
        }
        if let Some(dir) = &self.static_dir {
            if dir.trim().is_empty() {
                self.static_dir = None;
            }
        }
        Ok(())
    }
}

impl StorageConfig {
    pub fn validate(&self) -> Result<()> {
        if self.data_dir.trim().is_empty() {
            return Err(anyhow!("storage.data_dir must not be empty"));
        }
        for (key, name) in [("edb_os_file", &self.edb_os_file), ("assets_inventory_file", &self.assets_inventory_file)] {
            if !is_bare_file_name(name) {
                return Err(anyhow!("storage.{key} must be a plain file name, got {name:?}"));
            }
        }
        Ok(())
    }
}

impl UploadConfig {
    fn normalize_and_validate(&mut self) -> Result<()> {
        self.default_kind = self.default_kind.trim().to_lowercase();
        let mut seen = HashSet::new();
        for kind in &mut self.kinds {
            kind.name = kind.name.trim().to_lowercase();
            if kind.name.is_empty() {
                return Err(anyhow!("upload.kinds entries need a name"));
            }
            if !seen.insert(kind.name.clone()) {
                return Err(anyhow!("upload kind {:?} is declared twice", kind.name));
            }
            if kind.dir.trim().is_empty() {
                return Err(anyhow!("upload kind {:?} has an empty dir", kind.name));
            }
            for (ip, file) in &kind.sources {
                ip.parse::<IpAddr>()
                    .map_err(|_| anyhow!("upload kind {:?}: {ip:?} is not an IP address", kind.name))?;
                if !is_bare_file_name(file) {
                    return Err(anyhow!("upload kind {:?}: {file:?} must be a plain file name", kind.name));
                }
            }
        }
        Ok(())
    }
}

fn is_bare_file_name(name: &str) -> bool {
    let name = name.trim();
    !name.is_empty() && name != "." && name != ".." && !name.contains(|c: char| c == '/' || c == '\\')
}
