//! On-disk document: `{ "type": "<tag>", "records": [ { "ip": ..., ... } ] }`.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::errors::ModelError;
use crate::lenient;

/// One stored entry, addressed by `ip`.
///
/// Keys outside the dataset schema are carried in `extra` so that rewriting
/// the file never drops data written by other tools.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record<F> {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::trimmed_key")]
    pub ip: Option<String>,
    #[serde(flatten)]
    pub fields: F,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl<F: Default> Record<F> {
    pub fn new(ip: impl Into<String>) -> Self {
        Self { ip: Some(ip.into()), fields: F::default(), extra: Map::new() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document<F> {
    #[serde(rename = "type")]
    pub kind: String,
    pub records: Vec<Record<F>>,
}

/// Shapes found in the wild. Older files are a bare list, current ones an
/// object; anything else is treated as an empty document.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredShape {
    Bare(Vec<Value>),
    Wrapped(WrappedShape),
    Other(#[allow(dead_code)] Value),
}

#[derive(Deserialize)]
struct WrappedShape {
    #[serde(rename = "type", default)]
    kind: Option<Value>,
    #[serde(default)]
    records: Option<Value>,
    // written by the first generation of backends
    #[serde(default)]
    servers: Option<Value>,
}

impl<F> Document<F> {
    pub fn empty(tag: &str) -> Self {
        Self { kind: tag.to_string(), records: Vec::new() }
    }

    /// Index of the first record whose key equals `ip`.
    pub fn position(&self, ip: &str) -> Option<usize> {
        self.records.iter().position(|r| r.ip.as_deref() == Some(ip))
    }

    pub fn get(&self, ip: &str) -> Option<&Record<F>> {
        self.position(ip).map(|i| &self.records[i])
    }
}

impl<F: Serialize + DeserializeOwned> Document<F> {
    /// Fold every later record keyed `ip` into the first one and drop them,
    /// leaving a single record for that key. The first record's values win;
    /// later ones only fill keys it lacks.
    pub fn coalesce(&mut self, ip: &str) -> Option<usize> {
        let first = self.position(ip)?;
        let mut i = first + 1;
        while i < self.records.len() {
            if self.records[i].ip.as_deref() == Some(ip) {
                let dup = self.records.remove(i);
                fill_missing(&mut self.records[first], dup);
            } else {
                i += 1;
            }
        }
        Some(first)
    }
}

fn fill_missing<F: Serialize + DeserializeOwned>(into: &mut Record<F>, from: Record<F>) {
    let (Ok(Value::Object(mut base)), Ok(Value::Object(later))) = (serde_json::to_value(&*into), serde_json::to_value(&from))
    else {
        return;
    };
    for (key, value) in later {
        base.entry(key).or_insert(value);
    }
    match serde_json::from_value(Value::Object(base)) {
        Ok(merged) => *into = merged,
        Err(e) => warn!(ip = ?into.ip, error = %e, "could not fold duplicate record"),
    }
}

impl<F: DeserializeOwned> Document<F> {
    /// Decode file content. Blank input is an empty document; only invalid
    /// JSON is an error.
    pub fn parse(raw: &str, default_tag: &str) -> Result<Self, ModelError> {
        if raw.trim().is_empty() {
            return Ok(Self::empty(default_tag));
        }
        let shape: StoredShape = serde_json::from_str(raw)?;
        let (kind, items) = match shape {
            StoredShape::Bare(items) => (None, items),
            StoredShape::Wrapped(w) => {
                let kind = w
                    .kind
                    .and_then(|v| v.as_str().map(str::to_string))
                    .filter(|s| !s.trim().is_empty());
                let items = match (w.records, w.servers) {
                    (Some(Value::Array(items)), _) => items,
                    (_, Some(Value::Array(items))) => items,
                    _ => Vec::new(),
                };
                (kind, items)
            }
            StoredShape::Other(_) => (None, Vec::new()),
        };

        let total = items.len();
        let records: Vec<Record<F>> = items
            .into_iter()
            .filter(|v| v.is_object())
            .filter_map(|v| serde_json::from_value(v).ok())
            .collect();
        if records.len() != total {
            warn!(dropped = total - records.len(), "skipped records that are not JSON objects");
        }

        Ok(Self { kind: kind.unwrap_or_else(|| default_tag.to_string()), records })
    }
}
