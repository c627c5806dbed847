use relative_path::{RelativePath, RelativePathBuf};
use std::path::{Path, PathBuf};

/// Path of a file relative to the PAL's base directory.
///
/// ```
/// use jsonmock_base::FilePath;
///
/// let data_file = FilePath::from("db.json");
/// assert_eq!(data_file.to_string(), "db.json");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilePath(RelativePathBuf);

impl FilePath {
    /// Returns the underlying RelativePath.
    pub fn as_relative(&self) -> &RelativePath {
        &self.0
    }

    /// Converts to a regular Path, still relative to the PAL base directory.
    pub fn as_path(&self) -> &Path {
        Path::new(self.0.as_str())
    }

    /// The final component, if any.
    pub fn file_name(&self) -> Option<&str> {
        self.0.file_name()
    }

    /// Resolve against a base directory.
    pub fn to_path(&self, base: &Path) -> PathBuf {
        self.0.to_path(base)
    }
}

impl From<&str> for FilePath {
    fn from(s: &str) -> Self {
        Self(RelativePathBuf::from(s))
    }
}

impl From<String> for FilePath {
    fn from(s: String) -> Self {
        Self(RelativePathBuf::from(s))
    }
}

impl From<&RelativePath> for FilePath {
    fn from(p: &RelativePath) -> Self {
        Self(p.to_relative_path_buf())
    }
}

impl std::fmt::Display for FilePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<RelativePath> for FilePath {
    fn as_ref(&self) -> &RelativePath {
        &self.0
    }
}
