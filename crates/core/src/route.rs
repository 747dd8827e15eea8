//! Directory walk and extension-based routing
//!
//! Files are routed by extension alone: media goes to the S3 store, documents
//! go to the GCS store, anything else is left behind.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{Error, Result};

/// Extensions uploaded to the media store
pub const MEDIA_EXTENSIONS: &[&str] = &[
    "jpg", "png", "svg", "webp", "mp3", "mp4", "mpeg4", "wmv", "3gp", "webm",
];

/// Extensions uploaded to the document store
pub const DOCUMENT_EXTENSIONS: &[&str] = &["doc", "docx", "csv", "pdf"];

/// Where a file should be uploaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Destination {
    Media,
    Document,
    Unclassified,
}

impl Destination {
    /// Classify a lower-cased extension
    pub fn from_extension(ext: &str) -> Self {
        if MEDIA_EXTENSIONS.contains(&ext) {
            Destination::Media
        } else if DOCUMENT_EXTENSIONS.contains(&ext) {
            Destination::Document
        } else {
            Destination::Unclassified
        }
    }

    /// Classify a file by its extension
    pub fn for_path(path: &Path) -> Self {
        extension(path)
            .map(|ext| Self::from_extension(&ext))
            .unwrap_or(Destination::Unclassified)
    }
}

/// Lower-cased suffix after the last `.` of the file name
///
/// `.pdf` has the extension `pdf`; `README` and `archive.` have none. The
/// name is split on its raw bytes, so a stem that is not valid UTF-8 still
/// yields its extension.
pub fn extension(path: &Path) -> Option<String> {
    let name = path.file_name()?.as_encoded_bytes();
    let dot = name.iter().rposition(|b| *b == b'.')?;
    let ext = &name[dot + 1..];
    if ext.is_empty() {
        return None;
    }
    Some(String::from_utf8_lossy(ext).to_ascii_lowercase())
}

/// Files found under an input directory, grouped by destination
#[derive(Debug, Clone, Default, Serialize)]
pub struct RoutedFiles {
    /// Files bound for the media store
    pub media: Vec<PathBuf>,

    /// Files bound for the document store
    pub documents: Vec<PathBuf>,

    /// Files matching neither extension table
    pub ignored: Vec<PathBuf>,
}

impl RoutedFiles {
    /// True when there is nothing to upload
    pub fn is_empty(&self) -> bool {
        self.media.is_empty() && self.documents.is_empty()
    }

    fn push(&mut self, path: PathBuf) {
        match Destination::for_path(&path) {
            Destination::Media => self.media.push(path),
            Destination::Document => self.documents.push(path),
            Destination::Unclassified => {
                tracing::debug!(path = %path.display(), "Skipping file with unrecognized extension");
                self.ignored.push(path);
            }
        }
    }
}

/// Walk `root` recursively and route every regular file
///
/// The root itself must be a readable directory. Below it, unreadable
/// directories and entries are logged and skipped. Symlinks to files are
/// routed like files; symlinked directories are not descended.
pub fn scan(root: &Path) -> Result<RoutedFiles> {
    if !root.is_dir() {
        return Err(Error::InvalidPath(format!(
            "{} is not a directory",
            root.display()
        )));
    }

    let mut routed = RoutedFiles::default();
    let entries = read_dir_sorted(root)?;
    walk(entries, &mut routed);

    tracing::debug!(
        media = routed.media.len(),
        documents = routed.documents.len(),
        ignored = routed.ignored.len(),
        "Scanned {}",
        root.display()
    );

    Ok(routed)
}

fn walk(entries: Vec<PathBuf>, routed: &mut RoutedFiles) {
    for path in entries {
        let meta = match fs::symlink_metadata(&path) {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!(path = %path.display(), "Skipping unreadable entry: {e}");
                continue;
            }
        };

        if meta.is_dir() {
            match read_dir_sorted(&path) {
                Ok(children) => walk(children, routed),
                Err(e) => {
                    tracing::warn!(path = %path.display(), "Skipping unreadable directory: {e}");
                }
            }
        } else if meta.is_file() || (meta.file_type().is_symlink() && path.is_file()) {
            routed.push(path);
        } else {
            tracing::debug!(path = %path.display(), "Skipping non-regular file");
        }
    }
}

fn read_dir_sorted(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        match entry {
            Ok(entry) => paths.push(entry.path()),
            Err(e) => {
                tracing::warn!(dir = %dir.display(), "Skipping unreadable entry: {e}");
            }
        }
    }
    paths.sort();
    Ok(paths)
}
