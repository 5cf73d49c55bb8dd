//! Service layer for the annotation datasets and collector uploads.
//! - `storage` reads and atomically rewrites the JSON files.
//! - `records` implements upsert-by-IP and the keyed read view.
//! - `upload` routes collector reports to per-sender files.

pub mod errors;
pub mod runtime;
#[cfg(test)]
pub mod test_support;
pub mod storage;
pub mod records;
pub mod upload;
