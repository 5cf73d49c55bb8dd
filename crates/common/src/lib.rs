//! Shared helpers for the asset library workspace: logging setup,
//! runtime environment checks and small response types.

pub mod types;
pub mod utils;
pub mod env;
