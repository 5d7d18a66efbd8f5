//! Error types for the rule subsystem.

use thiserror::Error;
use trawl_core::RuleName;

use crate::definition::Scope;

/// Errors that can occur while loading or building rules.
#[derive(Error, Debug)]
pub enum RuleError {
    /// Rule not found by name
    #[error("rule not found: {name}")]
    NotFound {
        /// The rule name that was not found
        name: String,
    },

    /// Failed to load a rule file
    #[error("failed to load rule file {path}: {source}")]
    LoadError {
        /// Path to the rule file
        path: String,
        /// Underlying error
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to parse rule TOML
    #[error("failed to parse rule TOML in {path}: {source}")]
    ParseError {
        /// Path (or origin label) of the TOML document
        path: String,
        /// TOML parse error
        #[source]
        source: toml::de::Error,
    },

    /// Invalid rule definition (validation failed)
    #[error("invalid rule definition for {name}: {reason}")]
    ValidationError {
        /// Rule being validated
        name: String,
        /// Reason for validation failure
        reason: String,
    },

    /// Word list entry does not compile
    #[error("invalid pattern {pattern:?} in rule {name}: {source}")]
    InvalidPattern {
        /// Rule owning the pattern
        name: String,
        /// Offending pattern
        pattern: String,
        /// Regex compilation error
        #[source]
        source: regex::Error,
    },

    /// Two rules share a name
    #[error("duplicate rule name: {name}")]
    DuplicateName {
        /// The repeated name
        name: String,
    },

    /// Relay chain does not resolve to a content rule
    #[error(transparent)]
    Relay(#[from] RelayIssue),

    /// Rule definitions directory not found
    #[error("rule definitions directory not found at {path}")]
    DirectoryNotFound {
        /// Expected directory path
        path: String,
    },

    /// I/O error while accessing rule definitions
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid rule name format
    #[error("invalid rule name: {0}")]
    InvalidName(#[from] trawl_core::TrawlError),
}

/// A Relay rule whose target does not satisfy the two-level chain invariant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RelayIssue {
    /// Relay rule without a `relay_target`
    #[error("relay rule {rule} has no relay_target")]
    NoTarget {
        /// The relay rule
        rule: RuleName,
    },

    /// `relay_target` names no rule in the set
    #[error("relay rule {rule} targets unknown rule {target}")]
    MissingTarget {
        /// The relay rule
        rule: RuleName,
        /// The unresolved target name
        target: RuleName,
    },

    /// Target does not inspect content
    #[error("relay rule {rule} targets {target} with scope {scope:?}, expected ContentInspection")]
    WrongScope {
        /// The relay rule
        rule: RuleName,
        /// The target rule
        target: RuleName,
        /// The target's actual scope
        scope: Scope,
    },

    /// Target is itself a Relay rule (chain deeper than two levels)
    #[error("relay rule {rule} targets another relay rule {target}")]
    ChainedRelay {
        /// The relay rule
        rule: RuleName,
        /// The target rule
        target: RuleName,
    },
}

impl RelayIssue {
    /// The relay rule that carries the defect.
    #[must_use]
    pub fn rule(&self) -> &RuleName {
        match self {
            Self::NoTarget { rule }
            | Self::MissingTarget { rule, .. }
            | Self::WrongScope { rule, .. }
            | Self::ChainedRelay { rule, .. } => rule,
        }
    }
}

/// Result type for rule operations.
pub type Result<T> = std::result::Result<T, RuleError>;
