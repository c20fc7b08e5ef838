//! Rule library: discovery, dependency ordering and merging
//!
//! A library is built once from a [`RuleSource`]. Construction reads the
//! header of every YAML document to learn its `name` and `require` list;
//! [`RulesLibrary::load_rules`] then parses the requested rule set and its
//! transitive dependencies and folds them into a single [`Rules`] graph.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};
use yabre_core::ast::{RuleSet, Rules};
use yabre_parser::RuleSetParser;

use crate::error::{RepositoryError, RepositoryResult};
use crate::file_system::FileSystemSource;
use crate::traits::{is_rule_document, RuleSource};

/// How a [`RulesLibrary`] finds its documents
///
/// `source` wins when both are set; otherwise a [`FileSystemSource`] rooted
/// at `base_path` is used.
#[derive(Clone, Default)]
pub struct LibrarySettings {
    pub base_path: Option<PathBuf>,
    pub source: Option<Arc<dyn RuleSource>>,
}

impl LibrarySettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_path(mut self, base_path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(base_path.into());
        self
    }

    pub fn with_source(mut self, source: impl RuleSource + 'static) -> Self {
        let source: Arc<dyn RuleSource> = Arc::new(source);
        self.source = Some(source);
        self
    }
}

impl std::fmt::Debug for LibrarySettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LibrarySettings")
            .field("base_path", &self.base_path)
            .field("source", &self.source.as_ref().map(|s| s.describe()))
            .finish()
    }
}

/// A scanned collection of named rule sets
pub struct RulesLibrary {
    source: Arc<dyn RuleSource>,
    /// rule set name -> document path
    rule_paths: HashMap<String, String>,
    /// rule set name -> declared dependencies
    dependencies: HashMap<String, Vec<String>>,
}

impl RulesLibrary {
    /// Scan the configured source and index every rule-set document
    pub fn new(settings: LibrarySettings) -> RepositoryResult<Self> {
        let source: Arc<dyn RuleSource> = match (settings.source, settings.base_path) {
            (Some(source), _) => source,
            (None, Some(base_path)) => Arc::new(FileSystemSource::new(base_path)?),
            (None, None) => return Err(RepositoryError::NoSource),
        };

        let mut library = Self {
            source,
            rule_paths: HashMap::new(),
            dependencies: HashMap::new(),
        };
        library.scan()?;

        info!(
            "Loaded rules library from {} with {} rule sets",
            library.source.describe(),
            library.rule_paths.len()
        );
        Ok(library)
    }

    /// Shortcut for a library rooted at a directory
    pub fn from_path(base_path: impl Into<PathBuf>) -> RepositoryResult<Self> {
        Self::new(LibrarySettings::new().with_base_path(base_path))
    }

    fn scan(&mut self) -> RepositoryResult<()> {
        for path in self.source.list()? {
            if !is_rule_document(&path) {
                warn!("Skipping {}: not a YAML document", path);
                continue;
            }

            let content = self.source.read(&path)?;
            let header =
                RuleSetParser::parse_header(&content).map_err(|source| RepositoryError::Parse {
                    path: path.clone(),
                    source,
                })?;

            let name = match header.name {
                Some(name) if !name.is_empty() => name,
                _ => return Err(RepositoryError::MissingName { path }),
            };

            if self.rule_paths.contains_key(&name) {
                return Err(RepositoryError::DuplicateName { name });
            }

            debug!("Indexed rule set '{}' at {} (requires {:?})", name, path, header.require);
            self.dependencies.insert(name.clone(), header.require);
            self.rule_paths.insert(name, path);
        }
        Ok(())
    }

    /// Rule set names mapped to their document paths
    pub fn rule_names_and_paths(&self) -> &HashMap<String, String> {
        &self.rule_paths
    }

    /// Declared dependencies of a rule set
    pub fn dependencies_of(&self, name: &str) -> Option<&[String]> {
        self.dependencies.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rule_paths.contains_key(name)
    }

    /// Dependencies of `name` in load order, excluding `name` itself
    ///
    /// Depth-first, each rule set visited once, dependencies before the
    /// rule sets requiring them. Cycles are not reported: a rule set already
    /// visited is skipped.
    pub fn resolve_dependencies(&self, name: &str) -> RepositoryResult<Vec<String>> {
        let mut visited = HashSet::new();
        let mut ordered = Vec::new();
        self.visit(name, &mut visited, &mut ordered)?;

        ordered.pop();
        Ok(ordered)
    }

    fn visit(
        &self,
        name: &str,
        visited: &mut HashSet<String>,
        ordered: &mut Vec<String>,
    ) -> RepositoryResult<()> {
        if visited.contains(name) {
            return Ok(());
        }
        if !self.rule_paths.contains_key(name) {
            return Err(RepositoryError::RuleSetNotFound {
                name: name.to_string(),
            });
        }
        visited.insert(name.to_string());

        for dependency in self.dependencies_of(name).unwrap_or_default() {
            self.visit(dependency, visited, ordered)?;
        }

        ordered.push(name.to_string());
        Ok(())
    }

    /// Parse a single rule set without its dependencies
    pub fn load_rule_set(&self, name: &str) -> RepositoryResult<RuleSet> {
        let path = self
            .rule_paths
            .get(name)
            .ok_or_else(|| RepositoryError::RuleSetNotFound {
                name: name.to_string(),
            })?;

        let content = self.source.read(path)?;
        RuleSetParser::parse(&content).map_err(|source| RepositoryError::Parse {
            path: path.clone(),
            source,
        })
    }

    /// Resolve `name` and its dependencies into one validated graph
    pub fn load_rules(&self, name: &str) -> RepositoryResult<Rules> {
        let dependencies = self.resolve_dependencies(name)?;

        let main = self.load_rule_set(name)?;
        let mut rules = Rules::from_rule_set(main).map_err(|source| RepositoryError::InvalidGraph {
            name: name.to_string(),
            source,
        })?;

        for dependency in &dependencies {
            let rule_set = self.load_rule_set(dependency)?;
            rules
                .absorb(rule_set)
                .map_err(|source| RepositoryError::Merge {
                    name: name.to_string(),
                    dependency: dependency.clone(),
                    source,
                })?;
        }

        rules.validate().map_err(|source| RepositoryError::InvalidGraph {
            name: name.to_string(),
            source,
        })?;

        info!(
            "Resolved rule set '{}' with {} dependencies into {} conditions",
            name,
            dependencies.len(),
            rules.len()
        );
        Ok(rules)
    }
}

impl std::fmt::Debug for RulesLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RulesLibrary")
            .field("source", &self.source.describe())
            .field("rule_paths", &self.rule_paths)
            .finish()
    }
}
