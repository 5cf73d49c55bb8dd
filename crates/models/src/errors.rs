use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("parse error: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for ModelError {
    fn from(e: serde_json::Error) -> Self { Self::Parse(e.to_string()) }
}
