//! Best-effort batch uploads
//!
//! One session per backend per run, one file at a time. A session failure
//! abandons the batch before any file is attempted. A file failure is logged
//! and the batch continues with the next file. Objects are named by base file
//! name, so two files with the same name overwrite each other.

use std::path::{Path, PathBuf};

use jiff::Timestamp;
use serde::Serialize;

use crate::route::{Destination, RoutedFiles};
use crate::traits::StorageBackend;

/// Result of one upload attempt
#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    /// Local file
    pub path: PathBuf,

    /// Object key in the bucket
    pub object_name: String,

    /// Whether the backend accepted the file
    pub uploaded: bool,
}

/// What happened to the batch sent to one backend
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchReport {
    /// Nothing to upload; no session was opened
    Skipped,

    /// The session could not be established; no file was attempted
    SessionFailed { error: String },

    /// Every file was attempted
    Completed { outcomes: Vec<FileOutcome> },
}

impl BatchReport {
    /// Number of files handed to the backend
    pub fn attempted(&self) -> usize {
        match self {
            BatchReport::Completed { outcomes } => outcomes.len(),
            _ => 0,
        }
    }

    /// Number of files uploaded
    pub fn succeeded(&self) -> usize {
        match self {
            BatchReport::Completed { outcomes } => outcomes.iter().filter(|o| o.uploaded).count(),
            _ => 0,
        }
    }

    /// Number of files that failed
    pub fn failed(&self) -> usize {
        self.attempted() - self.succeeded()
    }

    /// False on a session failure or any failed file
    pub fn is_success(&self) -> bool {
        match self {
            BatchReport::Skipped => true,
            BatchReport::SessionFailed { .. } => false,
            BatchReport::Completed { .. } => self.failed() == 0,
        }
    }
}

/// Summary of a whole run
#[derive(Debug, Clone, Serialize)]
pub struct UploadReport {
    pub media: BatchReport,
    pub documents: BatchReport,
    /// Files left behind because their extension matched neither table
    pub ignored: usize,
    pub started_at: Timestamp,
    pub finished_at: Timestamp,
}

impl UploadReport {
    /// False if either batch had a failure
    pub fn is_success(&self) -> bool {
        self.media.is_success() && self.documents.is_success()
    }
}

/// Object key for a local file: its base name
pub fn object_name(path: &Path) -> Option<String> {
    path.file_name().map(|name| name.to_string_lossy().into_owned())
}

/// Content type guessed from the file extension
pub fn content_type(path: &Path) -> Option<String> {
    mime_guess::from_path(path)
        .first()
        .map(|m| m.essence_str().to_string())
}

/// Upload `files` to `backend`, one at a time
///
/// `on_file` is called after each attempt, successful or not.
pub async fn upload_batch<F>(
    backend: &dyn StorageBackend,
    files: &[PathBuf],
    mut on_file: F,
) -> BatchReport
where
    F: FnMut(&FileOutcome),
{
    if files.is_empty() {
        tracing::debug!(backend = backend.name(), "No files to upload");
        return BatchReport::Skipped;
    }

    let session = match backend.open_session().await {
        Ok(session) => session,
        Err(e) => {
            tracing::error!(
                backend = backend.name(),
                files = files.len(),
                "Failed to open session, skipping batch: {e}"
            );
            return BatchReport::SessionFailed {
                error: e.to_string(),
            };
        }
    };

    tracing::info!(
        backend = backend.name(),
        bucket = session.bucket(),
        files = files.len(),
        "Uploading batch"
    );

    let mut outcomes = Vec::with_capacity(files.len());
    for path in files {
        let outcome = match object_name(path) {
            Some(name) => {
                let uploaded = match session.put_file(path, &name).await {
                    Ok(()) => {
                        tracing::info!(
                            backend = backend.name(),
                            bucket = session.bucket(),
                            "Uploaded {} as {name}",
                            path.display()
                        );
                        true
                    }
                    Err(e) => {
                        tracing::error!(
                            backend = backend.name(),
                            bucket = session.bucket(),
                            "Failed to upload {}: {e}",
                            path.display()
                        );
                        false
                    }
                };
                FileOutcome {
                    path: path.clone(),
                    object_name: name,
                    uploaded,
                }
            }
            None => {
                tracing::error!(
                    backend = backend.name(),
                    "Failed to upload {}: path has no file name",
                    path.display()
                );
                FileOutcome {
                    path: path.clone(),
                    object_name: String::new(),
                    uploaded: false,
                }
            }
        };
        on_file(&outcome);
        outcomes.push(outcome);
    }

    BatchReport::Completed { outcomes }
}

/// Upload routed files: media first, then documents
///
/// `on_file` is told which batch each outcome belongs to.
pub async fn upload_routed<F>(
    routed: &RoutedFiles,
    media: &dyn StorageBackend,
    documents: &dyn StorageBackend,
    mut on_file: F,
) -> UploadReport
where
    F: FnMut(Destination, &FileOutcome),
{
    let started_at = Timestamp::now();

    if routed.is_empty() {
        tracing::info!("No files to upload");
    }

    let media_report =
        upload_batch(media, &routed.media, |o| on_file(Destination::Media, o)).await;
    let documents_report = upload_batch(documents, &routed.documents, |o| {
        on_file(Destination::Document, o)
    })
    .await;

    UploadReport {
        media: media_report,
        documents: documents_report,
        ignored: routed.ignored.len(),
        started_at,
        finished_at: Timestamp::now(),
    }
}
