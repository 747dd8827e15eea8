//! backup-s3: S3 SDK adapter for the backup CLI
//!
//! This crate implements the StorageBackend trait from backup-core
//! using the aws-sdk-s3 crate. It is the only crate that directly
//! depends on the AWS SDK.

pub mod client;

pub use client::{S3Backend, S3Session};
