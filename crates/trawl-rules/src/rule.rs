//! Compiled rules.
//!
//! A [`Rule`] is a validated [`RuleDefinition`] with its word list compiled
//! into case-insensitive byte regexes. The same predicate serves location
//! strings (names, extensions, paths) and raw file content.

use crate::definition::{Action, Location, MatchKind, RuleDefinition, Scope};
use crate::error::{Result, RuleError};
use regex::bytes::{Regex, RegexBuilder};
use std::ops::Range;
use trawl_core::{RuleName, Triage};

/// Upper bound on the compiled size of a single word list pattern.
const PATTERN_SIZE_LIMIT: usize = 1 << 20;

/// An immutable, compiled classifier rule.
#[derive(Debug, Clone)]
pub struct Rule {
    definition: RuleDefinition,
    patterns: Vec<Regex>,
}

impl Rule {
    /// Validate and compile a definition.
    pub fn compile(definition: RuleDefinition) -> Result<Self> {
        definition.validate()?;

        let patterns = definition
            .word_list
            .iter()
            .map(|word| compile_word(&definition, word))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            definition,
            patterns,
        })
    }

    /// Rule name.
    #[must_use]
    pub fn name(&self) -> &RuleName {
        &self.definition.name
    }

    /// Rule action.
    #[must_use]
    pub fn action(&self) -> Action {
        self.definition.action
    }

    /// Rule location.
    #[must_use]
    pub fn location(&self) -> Location {
        self.definition.location
    }

    /// Rule scope.
    #[must_use]
    pub fn scope(&self) -> Scope {
        self.definition.scope
    }

    /// Reported severity.
    #[must_use]
    pub fn triage(&self) -> Triage {
        self.definition.triage
    }

    /// Relay target name, for Relay rules.
    #[must_use]
    pub fn relay_target(&self) -> Option<&RuleName> {
        self.definition.relay_target.as_ref()
    }

    /// The source definition.
    #[must_use]
    pub fn definition(&self) -> &RuleDefinition {
        &self.definition
    }

    /// Whether any word list entry matches `haystack`.
    #[must_use]
    pub fn is_match(&self, haystack: &[u8]) -> bool {
        self.patterns.iter().any(|re| re.is_match(haystack))
    }

    /// Byte range of the first match, trying word list entries in order.
    #[must_use]
    pub fn find(&self, haystack: &[u8]) -> Option<Range<usize>> {
        self.patterns
            .iter()
            .find_map(|re| re.find(haystack))
            .map(|m| m.range())
    }
}

fn compile_word(definition: &RuleDefinition, word: &str) -> Result<Regex> {
    let pattern = match definition.match_kind {
        MatchKind::Exact => format!("^{}$", regex::escape(word)),
        MatchKind::Contains => regex::escape(word),
        MatchKind::StartsWith => format!("^{}", regex::escape(word)),
        MatchKind::EndsWith => format!("{}$", regex::escape(word)),
        MatchKind::Regex => word.to_string(),
    };

    RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .size_limit(PATTERN_SIZE_LIMIT)
        .build()
        .map_err(|source| RuleError::InvalidPattern {
            name: definition.name.to_string(),
            pattern: word.to_string(),
            source,
        })
}
