//! Rule definition types and structures.
//!
//! This module defines the data structures for classifier rules loaded from
//! TOML files. Each axis of a rule (`Action`, `Location`, `Scope`,
//! `MatchKind`) is a closed enum so the evaluator matches on it exhaustively.

use crate::error::{RuleError, Result};
use serde::{Deserialize, Serialize};
use trawl_core::{RuleName, Triage};

/// A TOML document holding an ordered list of rules.
///
/// ```toml
/// [[rule]]
/// name = "KeepKeePass"
/// action = "keep"
/// ...
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleFile {
    /// Rules in priority order
    #[serde(default, rename = "rule")]
    pub rules: Vec<RuleDefinition>,
}

/// Complete rule definition loaded from TOML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDefinition {
    /// Unique rule identifier
    pub name: RuleName,

    /// What happens when the rule fires
    pub action: Action,

    /// Which property of the object the predicate inspects
    pub location: Location,

    /// Whether the rule runs on enumerated metadata or materialized bytes
    pub scope: Scope,

    /// Severity reported for matches
    pub triage: Triage,

    /// How word list entries are interpreted
    pub match_kind: MatchKind,

    /// Words or patterns; the rule fires if any entry matches
    pub word_list: Vec<String>,

    /// Content rule applied after a Relay gate matches
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relay_target: Option<RuleName>,

    /// Free-text note for operators
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl RuleDefinition {
    /// Validate a single definition in isolation.
    ///
    /// Cross-rule relay checks live in [`RuleSet::validate`](crate::RuleSet::validate).
    pub fn validate(&self) -> Result<()> {
        if self.word_list.is_empty() {
            return Err(self.invalid("word_list cannot be empty"));
        }

        if self.word_list.iter().any(String::is_empty) {
            return Err(self.invalid("word_list entries cannot be empty"));
        }

        match (self.action, &self.relay_target) {
            (Action::Relay, None) => {
                return Err(self.invalid("relay rules must name a relay_target"));
            }
            (Action::Keep | Action::Discard, Some(_)) => {
                return Err(self.invalid("relay_target is only valid on relay rules"));
            }
            (Action::Relay, Some(target)) if target == &self.name => {
                return Err(self.invalid("relay rules cannot target themselves"));
            }
            _ => {}
        }

        match (self.scope, self.location) {
            (Scope::ContentInspection, Location::ByContent)
            | (
                Scope::MemberEnumeration,
                Location::ByExtension | Location::ByName | Location::ByPath,
            ) => {}
            (Scope::ContentInspection, _) => {
                return Err(self.invalid("content-inspection rules must use location by-content"));
            }
            (Scope::MemberEnumeration, Location::ByContent) => {
                return Err(self.invalid("by-content rules must use scope content-inspection"));
            }
        }

        if self.action == Action::Relay && self.scope == Scope::ContentInspection {
            return Err(self.invalid("relay rules gate on metadata and need scope member-enumeration"));
        }

        Ok(())
    }

    fn invalid(&self, reason: &str) -> RuleError {
        RuleError::ValidationError {
            name: self.name.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// What a rule does when its predicate matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    /// Report the object
    Keep,
    /// Report the object as suppressed; stops lower-priority rules
    Discard,
    /// Gate on metadata, then defer to `relay_target` for content inspection
    Relay,
}

/// Which property of an object a rule inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Location {
    /// File extension without the dot
    ByExtension,
    /// Final path component
    ByName,
    /// Full path (`<archive>/<key>` for members)
    ByPath,
    /// Materialized file bytes
    ByContent,
}

impl Location {
    /// Whether the location is evaluated on strings alone.
    #[must_use]
    pub fn is_location_based(&self) -> bool {
        !matches!(self, Self::ByContent)
    }
}

/// What a rule operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scope {
    /// File and member metadata: names, extensions, paths
    MemberEnumeration,
    /// Bytes of a file already on disk
    ContentInspection,
}

/// How word list entries are matched. All kinds are case-insensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchKind {
    /// Whole value equals the word
    Exact,
    /// Value contains the word
    Contains,
    /// Word is a regular expression
    Regex,
    /// Value starts with the word
    StartsWith,
    /// Value ends with the word
    EndsWith,
}
