//! Output formatter for human-readable and JSON output
//!
//! Renders upload plans and reports. Human output goes to stdout with
//! warnings and errors on stderr; JSON mode prints one document per run.

use std::path::{Path, PathBuf};

use backup_core::upload::object_name;
use backup_core::{BatchReport, FileOutcome, RoutedFiles, UploadReport};
use serde::Serialize;

use super::{OutputConfig, Targets};

#[derive(Debug, Serialize)]
struct PlannedUpload {
    source: String,
    target: String,
}

#[derive(Debug, Serialize)]
struct DryRunOutput {
    input_dir: String,
    media: Vec<PlannedUpload>,
    documents: Vec<PlannedUpload>,
    ignored: Vec<String>,
}

#[derive(Debug, Serialize)]
struct UploadOutput<'a> {
    status: &'static str,
    input_dir: String,
    #[serde(flatten)]
    report: &'a UploadReport,
}

/// Formatter for CLI output
///
/// Handles both human-readable and JSON output formats based on configuration.
/// When JSON mode is enabled, stdout carries a single JSON document per command.
#[derive(Debug, Clone)]
pub struct Formatter {
    config: OutputConfig,
}

impl Formatter {
    /// Create a new formatter with the given configuration
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    /// Check if JSON output mode is enabled
    pub fn is_json(&self) -> bool {
        self.config.json
    }

    /// Check if quiet mode is enabled
    pub fn is_quiet(&self) -> bool {
        self.config.quiet
    }

    fn colors_enabled(&self) -> bool {
        !self.config.no_color && !self.config.json
    }

    /// Output a success message
    pub fn success(&self, message: &str) {
        if self.config.quiet || self.config.json {
            return;
        }

        if self.colors_enabled() {
            println!("\x1b[32m✓\x1b[0m {message}");
        } else {
            println!("✓ {message}");
        }
    }

    /// Output an error message
    ///
    /// Errors are always printed, even in quiet mode.
    pub fn error(&self, message: &str) {
        if self.config.json {
            let error = serde_json::json!({
                "error": message
            });
            eprintln!(
                "{}",
                serde_json::to_string_pretty(&error).unwrap_or_else(|_| message.to_string())
            );
        } else if self.colors_enabled() {
            eprintln!("\x1b[31m✗\x1b[0m {message}");
        } else {
            eprintln!("✗ {message}");
        }
    }

    /// Output a warning message
    pub fn warning(&self, message: &str) {
        if self.config.quiet || self.config.json {
            return;
        }

        if self.colors_enabled() {
            eprintln!("\x1b[33m⚠\x1b[0m {message}");
        } else {
            eprintln!("⚠ {message}");
        }
    }

    fn json<T: Serialize>(&self, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("Error serializing output: {e}"),
        }
    }

    /// Print a line of text (respects quiet mode)
    pub fn println(&self, message: &str) {
        if self.config.quiet {
            return;
        }
        println!("{message}");
    }

    /// Show where each routed file would be uploaded
    pub fn plan(&self, input_dir: &Path, routed: &RoutedFiles, targets: &Targets) {
        let output = DryRunOutput {
            input_dir: input_dir.display().to_string(),
            media: planned(&routed.media, &targets.media),
            documents: planned(&routed.documents, &targets.documents),
            ignored: routed
                .ignored
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
        };

        if self.is_json() {
            self.json(&output);
            return;
        }

        for item in output.media.iter().chain(output.documents.iter()) {
            self.println(&format!("Would upload: {} -> {}", item.source, item.target));
        }
        self.println(&format!(
            "{} media file(s), {} document(s), {} ignored.",
            output.media.len(),
            output.documents.len(),
            output.ignored.len()
        ));
    }

    /// Summarize a finished run
    pub fn report(&self, input_dir: &Path, report: &UploadReport, targets: &Targets) {
        if self.is_json() {
            self.json(&UploadOutput {
                status: if report.is_success() {
                    "success"
                } else {
                    "partial"
                },
                input_dir: input_dir.display().to_string(),
                report,
            });
            return;
        }

        self.batch("media", &targets.media, &report.media);
        self.batch("document", &targets.documents, &report.documents);

        if report.ignored > 0 {
            self.println(&format!(
                "Skipped {} file(s) with unrecognized extensions.",
                report.ignored
            ));
        }
    }

    fn batch(&self, label: &str, target: &str, batch: &BatchReport) {
        match batch {
            BatchReport::Skipped => {}
            BatchReport::SessionFailed { error } => {
                self.error(&format!(
                    "Could not connect to {target}, no {label} files uploaded: {error}"
                ));
            }
            BatchReport::Completed { outcomes } => {
                for outcome in outcomes.iter().filter(|o| !o.uploaded) {
                    self.warning(&format!("Failed to upload {}", outcome.path.display()));
                }
                let message = batch_summary(label, target, batch);
                if batch.failed() > 0 {
                    self.warning(&message);
                } else {
                    self.success(&message);
                }
            }
        }
    }
}

/// One line for an uploaded file: source, destination and size
pub fn upload_line(outcome: &FileOutcome, target: &str) -> String {
    let line = format!(
        "{} -> {target}/{}",
        outcome.path.display(),
        outcome.object_name
    );
    match std::fs::metadata(&outcome.path) {
        Ok(meta) => format!(
            "{line} ({})",
            humansize::format_size(meta.len(), humansize::BINARY)
        ),
        Err(_) => line,
    }
}

fn planned(files: &[PathBuf], target: &str) -> Vec<PlannedUpload> {
    files
        .iter()
        .map(|p| PlannedUpload {
            source: p.display().to_string(),
            target: format!("{target}/{}", object_name(p).unwrap_or_default()),
        })
        .collect()
}

fn batch_summary(label: &str, target: &str, batch: &BatchReport) -> String {
    format!(
        "Uploaded {}/{} {label} file(s) to {target}.",
        batch.succeeded(),
        batch.attempted()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(path: &Path, uploaded: bool) -> FileOutcome {
        FileOutcome {
            path: path.to_path_buf(),
            object_name: object_name(path).unwrap_or_default(),
            uploaded,
        }
    }

    #[test]
    fn test_formatter_json_mode() {
        let formatter = Formatter::new(OutputConfig {
            json: true,
            ..Default::default()
        });
        assert!(formatter.is_json());
        assert!(!formatter.colors_enabled());
    }

    #[test]
    fn test_formatter_no_color() {
        let formatter = Formatter::new(OutputConfig {
            no_color: true,
            ..Default::default()
        });
        assert!(!formatter.is_json());
        assert!(!formatter.colors_enabled());
    }

    #[test]
    fn test_planned_target_uses_base_name() {
        let planned = planned(&[PathBuf::from("photos/2024/a.jpg")], "s3://media");
        assert_eq!(planned.len(), 1);
        assert_eq!(planned[0].source, "photos/2024/a.jpg");
        assert_eq!(planned[0].target, "s3://media/a.jpg");
    }

    #[test]
    fn test_upload_line_includes_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("b.pdf");
        std::fs::write(&path, vec![0u8; 2048]).unwrap();

        let line = upload_line(&outcome(&path, true), "gs://docs");
        assert!(line.contains("-> gs://docs/b.pdf ("), "{line}");
        assert!(line.ends_with("KiB)"), "{line}");
    }

    #[test]
    fn test_upload_line_without_local_file() {
        let line = upload_line(&outcome(Path::new("/gone/a.jpg"), true), "s3://media");
        assert_eq!(line, "/gone/a.jpg -> s3://media/a.jpg");
    }

    #[test]
    fn test_batch_summary_counts_attempts() {
        let batch = BatchReport::Completed {
            outcomes: vec![
                outcome(Path::new("/x/a.jpg"), true),
                outcome(Path::new("/x/b.jpg"), false),
            ],
        };
        assert_eq!(
            batch_summary("media", "s3://media", &batch),
            "Uploaded 1/2 media file(s) to s3://media."
        );
    }

    #[test]
    fn test_upload_output_serializes_batches() {
        let report = UploadReport {
            media: BatchReport::SessionFailed {
                error: "bucket not found".into(),
            },
            documents: BatchReport::Skipped,
            ignored: 3,
            started_at: jiff::Timestamp::UNIX_EPOCH,
            finished_at: jiff::Timestamp::UNIX_EPOCH,
        };
        let value = serde_json::to_value(UploadOutput {
            status: "partial",
            input_dir: "/data".into(),
            report: &report,
        })
        .unwrap();

        assert_eq!(value["status"], "partial");
        assert_eq!(value["media"]["status"], "session_failed");
        assert_eq!(value["documents"]["status"], "skipped");
        assert_eq!(value["ignored"], 3);
    }
}
