//! Release version discovery.
//!
//! The version of a release is not configured by hand: it is read from a
//! marker constant in one of the published VHDL sources, e.g.
//!
//! ```vhdl
//! constant C_UVVM_VERSION : string := "v2 2024.03.07";
//! ```

use std::path::Path;
use thiserror::Error;
use tokio::fs;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

/// Error types for version operations.
#[derive(Error, Debug)]
pub enum VersionError {
    #[error("IO error reading {0}: {1}")]
    IoError(String, #[source] std::io::Error),

    #[error("Version marker '{marker}' not found in {file}")]
    NotFound { marker: String, file: String },
}

/// Extract the version from one line: the text between the first pair of
/// double quotes, if the line contains the marker.
pub fn parse_version_line(line: &str, marker: &str) -> Option<String> {
    if !line.contains(marker) {
        return None;
    }
    line.split('"').nth(1).map(|v| v.to_string())
}

/// Scan `path` line by line for the first quoted value on a line carrying
/// `marker`.
pub async fn find_version_tag(path: &Path, marker: &str) -> Result<String, VersionError> {
    let file_label = path.display().to_string();
    let file = fs::File::open(path)
        .await
        .map_err(|e| VersionError::IoError(file_label.clone(), e))?;
    let mut lines = BufReader::new(file).lines();

    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| VersionError::IoError(file_label.clone(), e))?
    {
        if let Some(version) = parse_version_line(&line, marker) {
            debug!(version = %version, file = %file_label, "Found release version");
            return Ok(version);
        }
    }

    Err(VersionError::NotFound {
        marker: marker.to_string(),
        file: file_label,
    })
}
