use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("unknown upload type '{0}'")]
    UnknownKind(String),
    #[error("no target file configured for IP {ip} and type {kind}")]
    UnmappedSource { ip: String, kind: String },
    #[error("storage error: {0}")]
    Storage(String),
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl ServiceError {
    pub fn storage(path: &std::path::Path, e: impl std::fmt::Display) -> Self {
        Self::Storage(format!("{}: {}", path.display(), e))
    }

    /// Errors caused by the caller's request rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::UnknownKind(_) | Self::UnmappedSource { .. })
    }
}
