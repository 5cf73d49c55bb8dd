//! Typed schemas for the annotation datasets kept next to the dashboard data.
//! - `document` holds the on-disk `{type, records}` shape and its tolerant decoding.
//! - `dataset` ties a tag, field set, patch and view together per dataset.
//! - `edb_os` and `assets_inventory` are the two concrete datasets.

pub mod errors;
pub mod lenient;
pub mod dataset;
pub mod document;
pub mod edb_os;
pub mod assets_inventory;

pub use dataset::Dataset;
pub use document::{Document, Record};
pub use edb_os::EdbOsVersions;
pub use assets_inventory::AssetsInventory;
