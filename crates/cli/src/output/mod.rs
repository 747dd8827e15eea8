//! Output formatting utilities
//!
//! This module provides formatters for CLI output in both human-readable
//! and JSON formats. It also handles the upload progress bar.

mod formatter;
mod progress;

use backup_core::{Config, Destination};

pub use formatter::{upload_line, Formatter};
pub use progress::ProgressBar;

/// Output configuration derived from CLI flags
#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    /// Use JSON output format
    pub json: bool,
    /// Disable colored output
    pub no_color: bool,
    /// Disable progress bar
    pub no_progress: bool,
    /// Suppress non-error output
    pub quiet: bool,
}

/// Bucket URLs each batch goes to, for display
#[derive(Debug, Clone)]
pub struct Targets {
    pub media: String,
    pub documents: String,
}

impl Targets {
    pub fn from_config(config: &Config) -> Self {
        Self {
            media: format!("s3://{}", config.s3.bucket.as_deref().unwrap_or("<unset>")),
            documents: format!("gs://{}", config.gcs.bucket.as_deref().unwrap_or("<unset>")),
        }
    }

    /// Bucket URL for a routed file; unclassified files go nowhere
    pub fn for_destination(&self, destination: Destination) -> Option<&str> {
        match destination {
            Destination::Media => Some(&self.media),
            Destination::Document => Some(&self.documents),
            Destination::Unclassified => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_targets_from_config() {
        let mut config = Config::default();
        config.s3.bucket = Some("media".into());
        let targets = Targets::from_config(&config);
        assert_eq!(targets.media, "s3://media");
        assert_eq!(targets.documents, "gs://<unset>");
        assert_eq!(targets.for_destination(Destination::Media), Some("s3://media"));
        assert_eq!(targets.for_destination(Destination::Document), Some("gs://<unset>"));
        assert_eq!(targets.for_destination(Destination::Unclassified), None);
    }
}
