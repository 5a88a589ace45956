use sha2::{Digest, Sha256};
use std::path::Path;
use tokio::fs;

/// Compute SHA-256 hash of a byte slice
pub fn compute_hash(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}

/// Compute SHA-256 hash of a file's contents.
///
/// VHDL sources and PDF documents are both copied, so the file is read as
/// raw bytes rather than text.
pub async fn compute_file_hash(path: &Path) -> Result<String, std::io::Error> {
    let content = fs::read(path).await?;
    Ok(compute_hash(&content))
}
