use std::{
    io::ErrorKind,
    marker::PhantomData,
    path::{Path, PathBuf},
    sync::Arc,
};

use models::{Dataset, Document, Record};
use serde::Serialize;
use tokio::{fs, sync::Mutex};
use tracing::{debug, error, warn};

use crate::errors::ServiceError;
use crate::storage::fs::{write_json_atomic, DOCUMENT_INDENT};

/// JSON file holding one dataset's `{type, records}` document.
///
/// Nothing is cached: every call reads the file again. Writers go through
/// [`JsonDocumentStore::update`], which holds a per-store lock across
/// load, mutate and save so overlapping writes are applied one after another.
pub struct JsonDocumentStore<D> {
    file_path: PathBuf,
    write_lock: Mutex<()>,
    _dataset: PhantomData<fn() -> D>,
}

#[derive(Serialize)]
struct Persisted<'a, F> {
    #[serde(rename = "type")]
    kind: &'a str,
    records: &'a [Record<F>],
}

impl<D: Dataset> JsonDocumentStore<D> {
    pub fn new<P: Into<PathBuf>>(path: P) -> Arc<Self> {
        Arc::new(Self { file_path: path.into(), write_lock: Mutex::new(()), _dataset: PhantomData })
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Read the document. Never fails: a missing, blank or unreadable file
    /// yields the empty document for this dataset.
    pub async fn load(&self) -> Document<D::Fields> {
        let raw = match fs::read_to_string(&self.file_path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Document::empty(D::TAG),
            Err(e) => {
                warn!(dataset = D::NAME, path = %self.file_path.display(), error = %e, "cannot read document; using empty one");
                return Document::empty(D::TAG);
            }
        };
        match Document::parse(&raw, D::TAG) {
            Ok(doc) => doc,
            Err(e) => {
                warn!(dataset = D::NAME, path = %self.file_path.display(), error = %e, "invalid JSON in document; using empty one");
                Document::empty(D::TAG)
            }
        }
    }

    /// Replace the file with `doc`. Failures are logged and returned, never retried.
    pub async fn save(&self, doc: &Document<D::Fields>) -> Result<(), ServiceError> {
        let kind = if doc.kind.trim().is_empty() { D::TAG } else { doc.kind.as_str() };
        let persisted = Persisted { kind, records: &doc.records };
        match write_json_atomic(&self.file_path, &persisted, DOCUMENT_INDENT).await {
            Ok(()) => {
                debug!(dataset = D::NAME, path = %self.file_path.display(), records = doc.records.len(), "document saved");
                Ok(())
            }
            Err(e) => {
                error!(dataset = D::NAME, path = %self.file_path.display(), error = %e, "failed to save document");
                Err(e)
            }
        }
    }

    /// Load, apply `f` and save under the store's write lock.
    pub async fn update<F, T>(&self, f: F) -> Result<T, ServiceError>
    where
        F: FnOnce(&mut Document<D::Fields>) -> T + Send,
        T: Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut doc = self.load().await;
        let out = f(&mut doc);
        self.save(&doc).await?;
        Ok(out)
    }
}
