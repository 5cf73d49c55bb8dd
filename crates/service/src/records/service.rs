use std::{collections::BTreeMap, path::PathBuf, sync::Arc};

use async_trait::async_trait;
use models::Dataset;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::error;

use crate::errors::ServiceError;
use crate::records::projection::project;
use crate::records::upsert::{apply_entries, entries_from_body, UpsertEntry};
use crate::storage::json_document_store::JsonDocumentStore;

/// What one write request did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UpsertSummary {
    pub created: usize,
    pub updated: usize,
}

/// Dataset operations as seen by the HTTP layer, with the schema erased so
/// every dataset can share one pair of handlers.
#[async_trait]
pub trait RecordsApi: Send + Sync {
    fn name(&self) -> &'static str;
    /// Read view as JSON; an empty object if anything goes wrong.
    async fn snapshot(&self) -> Value;
    /// Apply a `{ip, values}` or `{batch: [...]}` body and persist it.
    async fn upsert(&self, body: &Value) -> Result<UpsertSummary, ServiceError>;
}

/// Record store plus upsert and projection for one dataset.
pub struct DatasetService<D: Dataset> {
    store: Arc<JsonDocumentStore<D>>,
}

impl<D: Dataset> DatasetService<D> {
    pub fn new(store: Arc<JsonDocumentStore<D>>) -> Arc<Self> {
        Arc::new(Self { store })
    }

    pub fn open<P: Into<PathBuf>>(path: P) -> Arc<Self> {
        Self::new(JsonDocumentStore::new(path))
    }

    pub fn store(&self) -> &JsonDocumentStore<D> {
        &self.store
    }

    pub async fn projection(&self) -> BTreeMap<String, D::View> {
        let doc = self.store.load().await;
        project::<D>(&doc)
    }

    /// Apply all entries to one fresh load of the document and save once.
    /// The document is written even when `entries` is empty.
    pub async fn upsert_entries(&self, entries: Vec<UpsertEntry<D::Patch>>) -> Result<UpsertSummary, ServiceError> {
        let (created, updated) = self
            .store
            .update(move |doc| apply_entries::<D>(doc, entries))
            .await?;
        Ok(UpsertSummary { created, updated })
    }
}

#[async_trait]
impl<D: Dataset> RecordsApi for DatasetService<D> {
    fn name(&self) -> &'static str {
        D::NAME
    }

    async fn snapshot(&self) -> Value {
        let view = self.projection().await;
        serde_json::to_value(view).unwrap_or_else(|e| {
            error!(dataset = D::NAME, error = %e, "cannot encode read view");
            Value::Object(Map::new())
        })
    }

    async fn upsert(&self, body: &Value) -> Result<UpsertSummary, ServiceError> {
        let entries = entries_from_body::<D>(body);
        self.upsert_entries(entries).await
    }
}
