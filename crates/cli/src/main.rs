//! backup - upload media to S3 and documents to Google Cloud Storage
//!
//! Walks a directory tree, routes files by extension and uploads each
//! group to its own object store.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod exit_code;
mod output;

use commands::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber for logging; RUST_LOG takes precedence over --debug
    let default_filter = if cli.debug {
        "backup=debug,backup_cli=debug,backup_core=debug,backup_s3=debug,backup_gcs=debug,warn"
    } else {
        "warn"
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    let exit_code = commands::execute(cli).await;

    std::process::exit(exit_code.as_i32());
}
