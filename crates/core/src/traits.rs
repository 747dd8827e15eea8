//! Storage backend traits
//!
//! These traits define the interface the uploader needs from a cloud store.
//! They keep the core crate independent of any cloud SDK.

use std::path::Path;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::error::Result;

/// A cloud object store that can open an authenticated session on one bucket
///
/// This trait is implemented by the S3 and GCS adapters and can be mocked for testing.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Short backend name used in logs and reports
    fn name(&self) -> &str;

    /// Authenticate and check that the target bucket is usable
    ///
    /// Missing configuration, bad credentials and missing buckets are all errors.
    async fn open_session(&self) -> Result<Box<dyn BucketSession>>;
}

/// An authenticated handle to one bucket, scoped to one batch
#[cfg_attr(test, automock)]
#[async_trait]
pub trait BucketSession: Send + Sync {
    /// Bucket name
    fn bucket(&self) -> &str;

    /// Upload a local file as `object_name`, replacing any existing object
    async fn put_file(&self, path: &Path, object_name: &str) -> Result<()>;
}
