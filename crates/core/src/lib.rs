//! backup-core: Core library for the backup upload CLI
//!
//! This crate provides the core functionality for the backup CLI, including:
//! - Configuration management
//! - Directory walk and extension-based routing
//! - StorageBackend / BucketSession traits for cloud stores
//! - Best-effort batch uploads
//!
//! This crate is designed to be independent of any specific cloud SDK,
//! allowing for easy testing with mock backends.

pub mod config;
pub mod error;
pub mod route;
pub mod traits;
pub mod upload;

pub use config::{Config, ConfigManager, GcsConfig, S3Config};
pub use error::{Error, Result};
pub use route::{scan, Destination, RoutedFiles};
pub use traits::{BucketSession, StorageBackend};
pub use upload::{upload_batch, upload_routed, BatchReport, FileOutcome, UploadReport};
