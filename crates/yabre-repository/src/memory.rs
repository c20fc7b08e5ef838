//! In-memory rule source

use crate::error::RepositoryError;
use crate::traits::RuleSource;
use crate::RepositoryResult;
use std::collections::BTreeMap;

/// Documents held in memory, keyed by path
///
/// Useful for rules embedded in the binary:
///
/// ```
/// use yabre_repository::MemorySource;
///
/// let source = MemorySource::new()
///     .with_file("base.yaml", "name: base\n")
///     .with_file("app.yaml", "name: app\nrequire: [base]\n");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: BTreeMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.insert(path, content);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<String>) {
        self.files.insert(path.into(), content.into());
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl RuleSource for MemorySource {
    fn list(&self) -> RepositoryResult<Vec<String>> {
        Ok(self.files.keys().cloned().collect())
    }

    fn read(&self, path: &str) -> RepositoryResult<String> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound {
                path: path.to_string(),
            })
    }

    fn describe(&self) -> String {
        format!("memory ({} files)", self.files.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_is_sorted() {
        let source = MemorySource::new()
            .with_file("b.yaml", "name: b")
            .with_file("a.yaml", "name: a");
        assert_eq!(source.list().unwrap(), vec!["a.yaml", "b.yaml"]);
    }

    #[test]
    fn test_read_missing() {
        let source = MemorySource::new();
        assert!(matches!(
            source.read("nope.yaml"),
            Err(RepositoryError::NotFound { .. })
        ));
    }
}
