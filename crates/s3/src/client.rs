//! S3 client implementation
//!
//! Wraps aws-sdk-s3 and implements the StorageBackend trait from backup-core.

use std::path::Path;

use async_trait::async_trait;
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_smithy_types::byte_stream::ByteStream;

use backup_core::upload::content_type;
use backup_core::{BucketSession, Error, Result, S3Config, StorageBackend};

/// S3-compatible media store
#[derive(Debug, Clone)]
pub struct S3Backend {
    config: S3Config,
}

impl S3Backend {
    /// Create a backend; nothing is contacted until a session is opened
    pub fn new(config: S3Config) -> Self {
        Self { config }
    }

    async fn build_client(&self) -> Result<aws_sdk_s3::Client> {
        let (access_key, secret_key) = self.config.credentials()?;

        // Build credentials provider
        let credentials = aws_credential_types::Credentials::new(
            access_key,
            secret_key,
            None, // session token
            None, // expiry
            "backup-static-credentials",
        );

        // Build SDK config
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(aws_config::Region::new(self.config.region.clone()));
        if let Some(endpoint) = &self.config.endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        let config = loader.load().await;

        // Custom endpoints are usually S3-compatible servers that expect path-style addressing
        let s3_config = aws_sdk_s3::config::Builder::from(&config)
            .force_path_style(self.config.endpoint.is_some())
            .build();

        Ok(aws_sdk_s3::Client::from_conf(s3_config))
    }
}

#[async_trait]
impl StorageBackend for S3Backend {
    fn name(&self) -> &str {
        "s3"
    }

    async fn open_session(&self) -> Result<Box<dyn BucketSession>> {
        let bucket = self.config.bucket()?.to_string();
        let client = self.build_client().await?;

        client
            .head_bucket()
            .bucket(&bucket)
            .send()
            .await
            .map_err(|e| sdk_error(e, &format!("bucket {bucket}")))?;

        tracing::debug!(bucket = %bucket, region = %self.config.region, "S3 session established");

        Ok(Box::new(S3Session {
            inner: client,
            bucket,
        }))
    }
}

/// Session on one S3 bucket
pub struct S3Session {
    inner: aws_sdk_s3::Client,
    bucket: String,
}

#[async_trait]
impl BucketSession for S3Session {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn put_file(&self, path: &Path, object_name: &str) -> Result<()> {
        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| Error::General(format!("Failed to read {}: {e}", path.display())))?;

        let mut request = self
            .inner
            .put_object()
            .bucket(&self.bucket)
            .key(object_name)
            .body(body);

        if let Some(ct) = content_type(path) {
            request = request.content_type(ct);
        }

        request
            .send()
            .await
            .map_err(|e| sdk_error(e, &format!("s3://{}/{object_name}", self.bucket)))?;

        Ok(())
    }
}

fn sdk_error<E>(err: SdkError<E, HttpResponse>, context: &str) -> Error
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    let status = err.raw_response().map(|r| r.status().as_u16());
    let code = err.code().map(str::to_owned);
    let message = DisplayErrorContext(&err).to_string();
    classify(status, code.as_deref(), context, message)
}

/// Map an S3 failure to a core error from its HTTP status and error code
fn classify(status: Option<u16>, code: Option<&str>, context: &str, message: String) -> Error {
    match (status, code) {
        (Some(404), _) | (_, Some("NoSuchBucket" | "NotFound")) => {
            Error::NotFound(context.to_string())
        }
        (Some(401 | 403), _)
        | (_, Some("AccessDenied" | "InvalidAccessKeyId" | "SignatureDoesNotMatch")) => {
            Error::Auth(format!("{context}: {message}"))
        }
        _ => Error::Network(format!("{context}: {message}")),
    }
}
