use std::fmt;
use std::path::{Path, PathBuf};

/// Return the file name of a path: everything after the last `/` or `\`.
///
/// Both separators are recognised regardless of the host, since upstream
/// listings may come from either platform.
pub fn base_filename(path: &str) -> &str {
    match path.rfind(|c: char| c == '/' || c == '\\') {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// A discovered file: its full path, the root it was discovered under and
/// its base file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathEntry {
    pub path: String,
    pub root: PathBuf,
    pub file_name: String,
}

impl PathEntry {
    pub fn new(path: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file_name = base_filename(&path).to_string();
        Self {
            path,
            root: root.into(),
            file_name,
        }
    }

    /// Build an entry from a filesystem path
    pub fn from_path(path: &Path, root: &Path) -> Self {
        Self::new(path.to_string_lossy().into_owned(), root)
    }

    pub fn as_path(&self) -> &Path {
        Path::new(&self.path)
    }

    /// Path relative to the discovery root, if the entry lies under it
    pub fn relative_path(&self) -> Option<&Path> {
        self.as_path().strip_prefix(&self.root).ok()
    }
}

impl fmt::Display for PathEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}
