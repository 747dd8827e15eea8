//! GCS client implementation
//!
//! Authenticates with a service account key file and implements the
//! StorageBackend trait from backup-core.

use std::path::Path;

use async_trait::async_trait;
use google_cloud_auth::credentials::{service_account, Credentials};
use google_cloud_gax::error::rpc::Code;
use google_cloud_storage::client::{Storage, StorageControl};

use backup_core::{BucketSession, Error, GcsConfig, Result, StorageBackend};

/// GCS-compatible document store
#[derive(Debug, Clone)]
pub struct GcsBackend {
    config: GcsConfig,
}

impl GcsBackend {
    /// Create a backend; nothing is contacted until a session is opened
    pub fn new(config: GcsConfig) -> Self {
        Self { config }
    }

    async fn load_credentials(&self) -> Result<Credentials> {
        let path = self.config.credentials_file()?;
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::Config(format!(
                "Failed to read credentials file {}: {e}",
                path.display()
            ))
        })?;
        let key: serde_json::Value = serde_json::from_str(&content)?;

        service_account::Builder::new(key)
            .build()
            .map_err(|e| Error::Auth(format!("{}: {e}", path.display())))
    }
}

/// Resource name of a bucket, as the storage APIs expect it
fn bucket_path(bucket: &str) -> String {
    format!("projects/_/buckets/{bucket}")
}

#[async_trait]
impl StorageBackend for GcsBackend {
    fn name(&self) -> &str {
        "gcs"
    }

    async fn open_session(&self) -> Result<Box<dyn BucketSession>> {
        let bucket = self.config.bucket()?.to_string();
        let credentials = self.load_credentials().await?;

        let mut control = StorageControl::builder().with_credentials(credentials.clone());
        let mut storage = Storage::builder().with_credentials(credentials);
        if let Some(endpoint) = &self.config.endpoint {
            control = control.with_endpoint(endpoint);
            storage = storage.with_endpoint(endpoint);
        }
        let control = control
            .build()
            .await
            .map_err(|e| Error::General(format!("Failed to create GCS client: {e}")))?;
        let storage = storage
            .build()
            .await
            .map_err(|e| Error::General(format!("Failed to create GCS client: {e}")))?;

        let resource = bucket_path(&bucket);
        control
            .get_bucket()
            .set_name(&resource)
            .send()
            .await
            .map_err(|e| classify(&format!("bucket {bucket}"), &e))?;

        tracing::debug!(bucket = %bucket, "GCS session established");

        Ok(Box::new(GcsSession {
            inner: storage,
            bucket,
            resource,
        }))
    }
}

/// Session on one GCS bucket
pub struct GcsSession {
    inner: Storage,
    bucket: String,
    resource: String,
}

#[async_trait]
impl BucketSession for GcsSession {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn put_file(&self, path: &Path, object_name: &str) -> Result<()> {
        let payload = tokio::fs::File::open(path).await?;

        self.inner
            .write_object(&self.resource, object_name, payload)
            .send_unbuffered()
            .await
            .map_err(|e| classify(&format!("gs://{}/{object_name}", self.bucket), &e))?;

        Ok(())
    }
}

/// Map a GCS failure to a core error
fn classify(context: &str, err: &google_cloud_storage::Error) -> Error {
    classify_status(
        context,
        err.status().map(|s| s.code),
        err.http_status_code(),
        err.is_authentication(),
        err.to_string(),
    )
}

/// The RPC code wins over the HTTP status when both are present
fn classify_status(
    context: &str,
    code: Option<Code>,
    http_status: Option<u16>,
    authentication: bool,
    message: String,
) -> Error {
    match (code, http_status) {
        (Some(Code::NotFound), _) | (None, Some(404)) => Error::NotFound(context.to_string()),
        (Some(Code::PermissionDenied | Code::Unauthenticated), _) | (None, Some(401 | 403)) => {
            Error::Auth(format!("{context}: {message}"))
        }
        _ if authentication => Error::Auth(format!("{context}: {message}")),
        _ => Error::Network(format!("{context}: {message}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use google_cloud_gax::error::rpc::Status;
    use tempfile::TempDir;

    #[test]
    fn test_bucket_path() {
        assert_eq!(bucket_path("docs"), "projects/_/buckets/docs");
    }

    fn service_error(code: Code, message: &str) -> google_cloud_storage::Error {
        google_cloud_storage::Error::service(Status::default().set_code(code).set_message(message))
    }

    #[test]
    fn test_classify_service_errors() {
        let err = classify("bucket test", &service_error(Code::NotFound, "no such bucket"));
        assert!(matches!(err, Error::NotFound(ref s) if s == "bucket test"));

        let err = classify(
            "bucket docs",
            &service_error(Code::PermissionDenied, "caller lacks access"),
        );
        assert!(matches!(err, Error::Auth(_)));

        let err = classify("bucket docs", &service_error(Code::Unauthenticated, "expired"));
        assert!(matches!(err, Error::Auth(_)));

        let err = classify("gs://docs/a.pdf", &service_error(Code::Unavailable, "try later"));
        assert!(matches!(err, Error::Network(_)));
    }

    #[test]
    fn test_classify_ignores_digits_in_message() {
        let err = classify(
            "gs://docs/invoice-404.pdf",
            &service_error(Code::Internal, "request 401-403-404 failed"),
        );
        assert!(matches!(err, Error::Network(ref s) if s.contains("invoice-404.pdf")));
    }

    #[test]
    fn test_classify_http_status_without_rpc_code() {
        let err = classify_status("bucket docs", None, Some(404), false, String::new());
        assert!(matches!(err, Error::NotFound(_)));

        let err = classify_status("bucket docs", None, Some(403), false, "Forbidden".into());
        assert!(matches!(err, Error::Auth(_)));

        let err = classify_status("bucket docs", None, None, true, "bad token".into());
        assert!(matches!(err, Error::Auth(_)));

        let err = classify_status("gs://docs/a.pdf", None, Some(503), false, String::new());
        assert!(matches!(err, Error::Network(_)));
    }

    #[tokio::test]
    async fn test_open_session_without_bucket_is_config_error() {
        let backend = GcsBackend::new(GcsConfig {
            credentials_file: Some("/tmp/creds.json".into()),
            ..Default::default()
        });
        let err = backend.open_session().await.err().unwrap();
        assert!(matches!(err, Error::Config(_)));
    }

    #[tokio::test]
    async fn test_open_session_without_credentials_is_config_error() {
        let backend = GcsBackend::new(GcsConfig {
            bucket: Some("docs".into()),
            ..Default::default()
        });
        let err = backend.open_session().await.err().unwrap();
        assert!(matches!(err, Error::Config(_)));
    }

    #[tokio::test]
    async fn test_open_session_with_missing_credentials_file() {
        let dir = TempDir::new().unwrap();
        let backend = GcsBackend::new(GcsConfig {
            bucket: Some("docs".into()),
            credentials_file: Some(dir.path().join("missing.json")),
            endpoint: None,
        });
        let err = backend.open_session().await.err().unwrap();
        assert!(matches!(err, Error::Config(ref s) if s.contains("missing.json")));
    }

    #[tokio::test]
    async fn test_open_session_with_malformed_credentials_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("creds.json");
        std::fs::write(&path, "{ not json").unwrap();

        let backend = GcsBackend::new(GcsConfig {
            bucket: Some("docs".into()),
            credentials_file: Some(path),
            endpoint: None,
        });
        let err = backend.open_session().await.err().unwrap();
        assert!(matches!(err, Error::Json(_)));
    }
}
