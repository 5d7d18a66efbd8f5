//! Ordered, immutable rule set with relay resolution.

use crate::{
    definition::{Action, RuleDefinition, RuleFile, Scope},
    error::{RelayIssue, Result, RuleError},
    rule::Rule,
};
use std::collections::HashMap;
use trawl_core::RuleName;
use tracing::{debug, warn};

/// The configured rule list.
///
/// Rules keep their configured order, which encodes priority: classifiers
/// stop at the first rule that fires. A `RuleSet` is built once and then
/// shared read-only (typically behind an `Arc`) by every classifier; it has
/// no interior mutability.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
    index: HashMap<RuleName, usize>,
}

impl RuleSet {
    /// Compile definitions into a rule set.
    ///
    /// Rejects invalid definitions, uncompilable patterns and duplicate
    /// names. Relay chains are *not* enforced here; see [`validate`](Self::validate)
    /// and [`validated`](Self::validated).
    pub fn new(definitions: impl IntoIterator<Item = RuleDefinition>) -> Result<Self> {
        let mut rules = Vec::new();
        let mut index = HashMap::new();

        for definition in definitions {
            let rule = Rule::compile(definition)?;
            if index.contains_key(rule.name()) {
                return Err(RuleError::DuplicateName {
                    name: rule.name().to_string(),
                });
            }
            index.insert(rule.name().clone(), rules.len());
            rules.push(rule);
        }

        debug!(count = rules.len(), "compiled rule set");

        Ok(Self { rules, index })
    }

    /// Compile definitions and fail on the first relay-chain issue.
    pub fn validated(definitions: impl IntoIterator<Item = RuleDefinition>) -> Result<Self> {
        let set = Self::new(definitions)?;
        if let Some(issue) = set.validate().into_iter().next() {
            return Err(issue.into());
        }
        Ok(set)
    }

    /// Parse a `[[rule]]` TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let file: RuleFile = toml::from_str(contents).map_err(|source| RuleError::ParseError {
            path: "<inline>".to_string(),
            source,
        })?;
        Self::new(file.rules)
    }

    /// Rules in configured order.
    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    /// Rules evaluated directly against files and members, in order.
    ///
    /// Content-inspection rules are only reachable through a Relay rule.
    pub fn top_level(&self) -> impl Iterator<Item = &Rule> {
        self.rules
            .iter()
            .filter(|rule| rule.scope() == Scope::MemberEnumeration)
    }

    /// Look up a rule by name.
    #[must_use]
    pub fn get(&self, name: &RuleName) -> Option<&Rule> {
        self.index.get(name).map(|&idx| &self.rules[idx])
    }

    /// Look up a rule by name, as an error if absent.
    pub fn require(&self, name: &str) -> Result<&Rule> {
        let name = RuleName::new(name)?;
        self.get(&name).ok_or_else(|| RuleError::NotFound {
            name: name.to_string(),
        })
    }

    /// Resolve a Relay rule's target and check the two-level chain invariant.
    ///
    /// The target must exist, have scope `ContentInspection` and must not be a
    /// Relay rule itself.
    pub fn relay_target(&self, rule: &Rule) -> std::result::Result<&Rule, RelayIssue> {
        let target_name = rule.relay_target().ok_or_else(|| RelayIssue::NoTarget {
            rule: rule.name().clone(),
        })?;

        let target = self
            .get(target_name)
            .ok_or_else(|| RelayIssue::MissingTarget {
                rule: rule.name().clone(),
                target: target_name.clone(),
            })?;

        if target.action() == Action::Relay {
            return Err(RelayIssue::ChainedRelay {
                rule: rule.name().clone(),
                target: target.name().clone(),
            });
        }

        if target.scope() != Scope::ContentInspection {
            return Err(RelayIssue::WrongScope {
                rule: rule.name().clone(),
                target: target.name().clone(),
                scope: target.scope(),
            });
        }

        Ok(target)
    }

    /// Every relay-chain issue in the set, in rule order.
    #[must_use]
    pub fn validate(&self) -> Vec<RelayIssue> {
        let issues: Vec<RelayIssue> = self
            .rules
            .iter()
            .filter(|rule| rule.action() == Action::Relay)
            .filter_map(|rule| self.relay_target(rule).err())
            .collect();

        for issue in &issues {
            warn!(rule = %issue.rule(), issue = %issue, "relay chain issue");
        }

        issues
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the set has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
