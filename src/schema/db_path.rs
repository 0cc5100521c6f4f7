//! Table namespace.

use std::fmt;

/// Base path under which partition tables are created.
///
/// Rendered as `path/folder`, or just `path` when no folder is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbPath {
    pub path: String,
    pub folder: String,
}

impl DbPath {
    pub fn new(path: impl Into<String>, folder: impl Into<String>) -> Self {
        DbPath {
            path: path.into(),
            folder: folder.into(),
        }
    }

    /// Full path of a table directly under this namespace.
    pub fn full_table(&self, name: &str) -> String {
        let base = self.to_string();
        if base.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", base, name)
        }
    }
}

impl fmt::Display for DbPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self.path.trim_end_matches('/');
        let folder = self.folder.trim_matches('/');
        match (path.is_empty(), folder.is_empty()) {
            (_, true) => f.write_str(path),
            (true, false) => f.write_str(folder),
            (false, false) => write!(f, "{}/{}", path, folder),
        }
    }
}
