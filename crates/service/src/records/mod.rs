//! Annotation datasets: upsert-by-IP writes and the keyed read view.

pub mod projection;
pub mod service;
pub mod upsert;

pub use service::{DatasetService, RecordsApi, UpsertSummary};
