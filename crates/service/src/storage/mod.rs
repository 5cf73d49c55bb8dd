//! Storage abstractions for service layer
//!
//! File-backed stores and the atomic JSON writer they share.

pub mod fs;
pub mod json_document_store;
