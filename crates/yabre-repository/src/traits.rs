//! Source trait for rule-set documents
//!
//! A [`RuleSource`] is where a [`crate::RulesLibrary`] finds its documents:
//! a directory on disk, an in-memory table, or anything else that can list
//! paths and return their text.

use crate::RepositoryResult;

/// A readable collection of rule-set documents
pub trait RuleSource: Send + Sync {
    /// All document paths, relative to the source root, in a stable order
    ///
    /// Paths use `/` as separator. Non-YAML files may be included; the
    /// library filters them by extension.
    fn list(&self) -> RepositoryResult<Vec<String>>;

    /// Read the document at a path returned by [`RuleSource::list`]
    fn read(&self, path: &str) -> RepositoryResult<String>;

    /// Short description used in log messages
    fn describe(&self) -> String;
}

/// Whether a path names a rule-set document
pub fn is_rule_document(path: &str) -> bool {
    path.ends_with(".yaml") || path.ends_with(".yml")
}
