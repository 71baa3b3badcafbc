//! Storage layer for AgriSmart Core.
//!
//! A small document store on SQLite: farms, crops, analyses, sensor
//! readings, irrigation schedules and alerts all live in one `documents`
//! table as JSON bodies keyed by collection and id.

// SQL strings don't need hash-less raw strings
#![allow(clippy::needless_raw_string_hashes)]

pub mod database;
pub mod documents;
pub mod error;

pub use database::Database;
pub use documents::{Collection, Document, DocumentRepository};
pub use error::{StorageError, StorageResult};
