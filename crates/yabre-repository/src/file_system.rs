//! File system based rule source

use path_absolutize::Absolutize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::{error::RepositoryError, traits::RuleSource, RepositoryResult};

/// Rule source backed by a directory tree
///
/// Every file below the root is listed, recursively.
#[derive(Debug, Clone)]
pub struct FileSystemSource {
    /// Root path of the source
    root_path: PathBuf,
}

impl FileSystemSource {
    /// Create a new file system source
    ///
    /// # Example
    /// ```no_run
    /// use yabre_repository::FileSystemSource;
    ///
    /// let source = FileSystemSource::new("rules").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(root_path: P) -> RepositoryResult<Self> {
        let path = root_path.as_ref();

        if !path.is_dir() {
            return Err(RepositoryError::InvalidPath {
                path: path.to_path_buf(),
            });
        }

        let abs_path = path.absolutize()?.to_path_buf();

        Ok(Self {
            root_path: abs_path,
        })
    }

    /// Absolute root of this source
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    fn walk(&self, dir: &Path, out: &mut Vec<String>) -> RepositoryResult<()> {
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();

            if path.is_dir() {
                self.walk(&path, out)?;
            } else if let Ok(relative) = path.strip_prefix(&self.root_path) {
                let parts: Vec<_> = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect();
                out.push(parts.join("/"));
            }
        }
        Ok(())
    }
}

impl RuleSource for FileSystemSource {
    fn list(&self) -> RepositoryResult<Vec<String>> {
        let mut paths = Vec::new();
        self.walk(&self.root_path, &mut paths)?;
        paths.sort();

        debug!("Found {} files under {}", paths.len(), self.root_path.display());
        Ok(paths)
    }

    fn read(&self, path: &str) -> RepositoryResult<String> {
        let full_path = self.root_path.join(path);
        if !full_path.is_file() {
            return Err(RepositoryError::NotFound {
                path: path.to_string(),
            });
        }
        Ok(fs::read_to_string(full_path)?)
    }

    fn describe(&self) -> String {
        self.root_path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_list_recurses_into_subdirectories() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("nested/deeper")).unwrap();
        fs::write(temp_dir.path().join("top.yaml"), "name: top").unwrap();
        fs::write(temp_dir.path().join("nested/deeper/inner.yml"), "name: inner").unwrap();

        let source = FileSystemSource::new(temp_dir.path()).unwrap();
        assert_eq!(
            source.list().unwrap(),
            vec!["nested/deeper/inner.yml", "top.yaml"]
        );
        assert_eq!(source.read("top.yaml").unwrap(), "name: top");
    }

    #[test]
    fn test_missing_root_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("wrong");

        let err = FileSystemSource::new(&missing).unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidPath { ref path } if *path == missing));
    }

    #[test]
    fn test_read_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let source = FileSystemSource::new(temp_dir.path()).unwrap();
        assert!(matches!(
            source.read("absent.yaml"),
            Err(RepositoryError::NotFound { .. })
        ));
    }
}
