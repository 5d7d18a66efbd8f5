//! Rule definition loading from TOML files.
//!
//! This module handles loading rule definitions from a `rule-definitions/`
//! directory. Files are read in lexicographic path order and rules keep their
//! order within a file, so file names (e.g. `10-discard.toml`,
//! `20-keep.toml`) control priority.

use crate::{
    definition::{RuleDefinition, RuleFile},
    error::{Result, RuleError},
    set::RuleSet,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Loader for rule definitions from TOML files.
pub struct RuleLoader {
    /// Base directory containing rule definitions
    definitions_dir: PathBuf,
}

impl RuleLoader {
    /// Create a new loader with the given definitions directory.
    ///
    /// # Errors
    /// Returns error if the directory doesn't exist.
    pub fn new(definitions_dir: impl Into<PathBuf>) -> Result<Self> {
        let definitions_dir = definitions_dir.into();

        if !definitions_dir.is_dir() {
            return Err(RuleError::DirectoryNotFound {
                path: definitions_dir.display().to_string(),
            });
        }

        Ok(Self { definitions_dir })
    }

    /// Create a loader using the default definitions directory.
    ///
    /// Looks for `rule-definitions/` relative to the workspace root.
    ///
    /// # Errors
    /// Returns error if the default directory doesn't exist.
    pub fn with_default_dir() -> Result<Self> {
        // Find workspace root by looking for Cargo.toml with [workspace]
        let mut current_dir = std::env::current_dir()?;

        loop {
            let cargo_toml = current_dir.join("Cargo.toml");
            if cargo_toml.exists() {
                if let Ok(contents) = std::fs::read_to_string(&cargo_toml) {
                    if contents.contains("[workspace]") {
                        return Self::new(current_dir.join("rule-definitions"));
                    }
                }
            }

            if let Some(parent) = current_dir.parent() {
                current_dir = parent.to_path_buf();
            } else {
                break;
            }
        }

        Self::new(PathBuf::from("rule-definitions"))
    }

    /// Directory this loader reads from.
    #[must_use]
    pub fn definitions_dir(&self) -> &Path {
        &self.definitions_dir
    }

    /// Load all rule definitions in priority order.
    ///
    /// Files that cannot be read or parsed are logged as warnings and skipped.
    ///
    /// # Errors
    /// Returns error if the directory can't be read.
    pub fn load_all(&self) -> Result<Vec<RuleDefinition>> {
        let mut files = Vec::new();
        Self::collect_toml_files(&self.definitions_dir, &mut files)?;
        files.sort();

        let mut definitions = Vec::new();
        for path in &files {
            match Self::load_from_path(path) {
                Ok(file) => {
                    debug!(path = %path.display(), count = file.rules.len(), "loaded rule file");
                    definitions.extend(file.rules);
                }
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "failed to load rule file"
                    );
                }
            }
        }

        info!(
            count = definitions.len(),
            dir = %self.definitions_dir.display(),
            "loaded rule definitions"
        );

        Ok(definitions)
    }

    /// Load all definitions and compile them into a [`RuleSet`].
    ///
    /// Relay-chain issues are logged, not rejected; the engine re-checks them
    /// when a Relay rule fires.
    pub fn load_rule_set(&self) -> Result<RuleSet> {
        let set = RuleSet::new(self.load_all()?)?;
        let issues = set.validate();
        if !issues.is_empty() {
            warn!(count = issues.len(), "rule set has relay chain issues");
        }
        Ok(set)
    }

    /// Recursively collect `*.toml` files.
    fn collect_toml_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();

            if path.is_dir() {
                Self::collect_toml_files(&path, files)?;
            } else if path.extension().and_then(|s| s.to_str()) == Some("toml") {
                files.push(path);
            }
        }

        Ok(())
    }

    /// Load a rule file from a specific path.
    fn load_from_path(path: &Path) -> Result<RuleFile> {
        let contents = std::fs::read_to_string(path).map_err(|e| RuleError::LoadError {
            path: path.display().to_string(),
            source: Box::new(e),
        })?;

        toml::from_str(&contents).map_err(|e| RuleError::ParseError {
            path: path.display().to_string(),
            source: e,
        })
    }
}
