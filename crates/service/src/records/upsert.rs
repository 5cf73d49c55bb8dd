//! Merge partial updates into a document, keyed by `ip`.

use models::{Dataset, Document, Record};
use serde_json::Value;
use tracing::{debug, info};

/// One decoded `{ ip, values }` entry.
#[derive(Debug)]
pub struct UpsertEntry<P> {
    pub ip: String,
    pub values: P,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

/// Entries carried by a POST body: `{ batch: [...] }` or a single `{ ip, values }`.
/// Entries that cannot be decoded are left out.
pub fn entries_from_body<D: Dataset>(body: &Value) -> Vec<UpsertEntry<D::Patch>> {
    match body.get("batch") {
        Some(Value::Array(items)) => items.iter().filter_map(parse_entry::<D>).collect(),
        _ => parse_entry::<D>(body).into_iter().collect(),
    }
}

/// `None` when `ip` is missing or blank, or `values` is not an object.
pub fn parse_entry<D: Dataset>(value: &Value) -> Option<UpsertEntry<D::Patch>> {
    let obj = value.as_object()?;
    let ip = obj
        .get("ip")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|ip| !ip.is_empty())?;
    let values = obj.get("values").filter(|v| v.is_object())?;
    match serde_json::from_value::<D::Patch>(values.clone()) {
        Ok(values) => Some(UpsertEntry { ip: ip.to_string(), values }),
        Err(e) => {
            debug!(dataset = D::NAME, %ip, error = %e, "skipping entry with undecodable values");
            None
        }
    }
}

/// Update the record for `entry.ip`, or append a new one. Duplicates of the
/// key already in the file are folded into the first record, so the key is
/// unique once the entry is applied.
pub fn apply_entry<D: Dataset>(doc: &mut Document<D::Fields>, entry: UpsertEntry<D::Patch>) -> UpsertOutcome {
    let UpsertEntry { ip, values } = entry;
    match doc.coalesce(&ip) {
        Some(idx) => {
            let record = &mut doc.records[idx];
            D::merge(&mut record.fields, values);
            record.ip = Some(ip);
            UpsertOutcome::Updated
        }
        None => {
            let mut record = Record::new(ip);
            D::merge(&mut record.fields, values);
            doc.records.push(record);
            UpsertOutcome::Created
        }
    }
}

/// Apply entries in order; later entries for the same `ip` see earlier ones.
pub fn apply_entries<D: Dataset>(
    doc: &mut Document<D::Fields>,
    entries: Vec<UpsertEntry<D::Patch>>,
) -> (usize, usize) {
    let (mut created, mut updated) = (0, 0);
    for entry in entries {
        let ip = entry.ip.clone();
        match apply_entry::<D>(doc, entry) {
            UpsertOutcome::Created => {
                created += 1;
                info!(dataset = D::NAME, %ip, "created entry");
            }
            UpsertOutcome::Updated => {
                updated += 1;
                info!(dataset = D::NAME, %ip, "updated entry");
            }
        }
    }
    (created, updated)
}
