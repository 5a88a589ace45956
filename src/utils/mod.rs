mod hash;

pub use hash::{compute_file_hash, compute_hash};

use std::path::{Path, PathBuf};

/// Default name of the release configuration file
pub const CONFIG_FILE: &str = "release.json";

/// Date format embedded in generated commit messages
pub const DATE_FORMAT: &str = "%Y.%m.%d";

/// Get the path to the release configuration file in a work directory
pub fn get_config_path(work_dir: &Path) -> PathBuf {
    work_dir.join(CONFIG_FILE)
}

/// Resolve `path` against `base` unless it is already absolute
pub fn resolve_path(base: &Path, path: &str) -> PathBuf {
    let candidate = Path::new(path);
    if path.is_empty() || path == "." {
        base.to_path_buf()
    } else if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        base.join(candidate)
    }
}

/// Get today's date in the commit message format
pub fn today() -> String {
    chrono::Local::now().format(DATE_FORMAT).to_string()
}
