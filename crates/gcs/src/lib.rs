//! backup-gcs: Google Cloud Storage adapter for the backup CLI
//!
//! Implements the StorageBackend trait from backup-core with the
//! google-cloud-storage crate. It is the only crate that directly
//! depends on the Google Cloud SDK.

pub mod client;

pub use client::{GcsBackend, GcsSession};
