//! CLI command definitions and execution
//!
//! This module contains all CLI commands and their implementations.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::exit_code::ExitCode;
use crate::output::OutputConfig;

pub mod upload;

/// backup - upload media to S3 and documents to Google Cloud Storage
///
/// Files are routed by extension: images, audio and video go to the S3 bucket,
/// office documents, CSV and PDF go to the GCS bucket, everything else is skipped.
#[derive(Parser, Debug)]
#[command(name = "backup")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file (default: ~/.config/backup/config.toml)
    #[arg(long, global = true, env = "BACKUP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format: human-readable or JSON
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true, default_value = "false")]
    pub no_color: bool,

    /// Disable progress bar
    #[arg(long, global = true, default_value = "false")]
    pub no_progress: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, default_value = "false")]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true, default_value = "false")]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upload files from a directory tree
    Upload(upload::UploadArgs),
}

/// Execute the CLI command and return an exit code
pub async fn execute(cli: Cli) -> ExitCode {
    let output_config = OutputConfig {
        json: cli.json,
        no_color: cli.no_color,
        no_progress: cli.no_progress,
        quiet: cli.quiet,
    };

    match cli.command {
        Commands::Upload(args) => upload::execute(args, cli.config, output_config).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_defaults() {
        let cli = Cli::try_parse_from(["backup", "upload"]).unwrap();
        let Commands::Upload(args) = cli.command else {
            panic!("expected upload command");
        };
        assert_eq!(args.input_dir, PathBuf::from("."));
        assert!(!args.dry_run);
        assert!(!cli.json);
    }

    #[test]
    fn test_upload_input_dir_and_global_flags() {
        let cli = Cli::try_parse_from([
            "backup",
            "upload",
            "--input-dir",
            "/srv/media",
            "--json",
            "--config",
            "/etc/backup.toml",
        ])
        .unwrap();
        assert!(cli.json);
        assert_eq!(cli.config, Some(PathBuf::from("/etc/backup.toml")));
        let Commands::Upload(args) = cli.command else {
            panic!("expected upload command");
        };
        assert_eq!(args.input_dir, PathBuf::from("/srv/media"));
    }

    #[test]
    fn test_unknown_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["backup", "download"]).is_err());
        assert!(Cli::try_parse_from(["backup", "completions", "bash"]).is_err());
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
