//! upload command - Route files by extension and upload them
//!
//! Media files go to the S3 bucket, documents to the GCS bucket. Individual
//! failures are reported but never change the exit code.

use std::path::PathBuf;

use backup_core::{scan, upload_routed, Config, ConfigManager, Error};
use backup_gcs::GcsBackend;
use backup_s3::S3Backend;
use clap::Args;

use crate::exit_code::ExitCode;
use crate::output::{upload_line, Formatter, OutputConfig, ProgressBar, Targets};

/// Upload files from a directory tree
#[derive(Args, Debug)]
pub struct UploadArgs {
    /// Directory to scan for files to upload
    #[arg(long, default_value = ".")]
    pub input_dir: PathBuf,

    /// Only show where files would be uploaded
    #[arg(long)]
    pub dry_run: bool,
}

/// Execute the upload command
pub async fn execute(
    args: UploadArgs,
    config_path: Option<PathBuf>,
    output_config: OutputConfig,
) -> ExitCode {
    let formatter = Formatter::new(output_config.clone());

    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            formatter.error(&format!("Failed to load configuration: {e}"));
            return ExitCode::from_error(&e);
        }
    };

    let routed = match scan(&args.input_dir) {
        Ok(r) => r,
        Err(e) => {
            formatter.error(&format!("Cannot scan input directory: {e}"));
            return ExitCode::from_error(&e);
        }
    };

    let targets = Targets::from_config(&config);

    if args.dry_run {
        formatter.plan(&args.input_dir, &routed, &targets);
        return ExitCode::Success;
    }

    if routed.is_empty() && !formatter.is_json() {
        formatter.success(&format!(
            "No files to upload in {}.",
            args.input_dir.display()
        ));
        return ExitCode::Success;
    }

    let media = S3Backend::new(config.s3.clone());
    let documents = GcsBackend::new(config.gcs.clone());

    let total = (routed.media.len() + routed.documents.len()) as u64;
    let progress = ProgressBar::new(&output_config, total);
    let report = upload_routed(&routed, &media, &documents, |destination, outcome| {
        progress.inc(1);
        progress.set_message(&outcome.object_name);
        if !outcome.uploaded || formatter.is_json() || formatter.is_quiet() {
            return;
        }
        if let Some(target) = targets.for_destination(destination) {
            let line = upload_line(outcome, target);
            if !progress.println(&line) {
                formatter.println(&line);
            }
        }
    })
    .await;
    progress.finish_and_clear();

    formatter.report(&args.input_dir, &report, &targets);

    // Failures are reported above; the run itself still succeeded
    ExitCode::Success
}

fn load_config(config_path: Option<PathBuf>) -> Result<Config, Error> {
    let manager = match config_path {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new()?,
    };
    let mut config = manager.load()?;
    config.apply_env(|key| std::env::var(key).ok());
    config.validate()?;
    Ok(config)
}
