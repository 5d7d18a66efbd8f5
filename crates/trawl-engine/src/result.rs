//! Match records delivered to the sink.

use once_cell::sync::Lazy;
use serde::Serialize;
use std::path::Path;
use trawl_core::{FileDescriptor, RuleName, Triage};
use trawl_rules::{Action, Rule};

/// Reserved rule name for results that report an encrypted container.
///
/// This is a protocol constant, not a configured rule: a result bearing it
/// means inspection failed because of encryption, not that content matched.
pub const ENCRYPTED_ARCHIVE_RULE: &str = "EncryptedArchive";

static ENCRYPTED_ARCHIVE_NAME: Lazy<RuleName> =
    Lazy::new(|| RuleName::new(ENCRYPTED_ARCHIVE_RULE).expect("reserved rule name is valid"));

/// One confirmed match.
///
/// Immutable once built; ownership moves to the sink on emission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanResult {
    /// The file or archive member that matched
    pub descriptor: FileDescriptor,
    /// Rule that produced the match (the content rule, for relays)
    pub rule_name: RuleName,
    /// Severity of the matching rule
    pub triage: Triage,
    /// Action of the matching rule; `None` for synthetic results
    pub action: Option<Action>,
    /// Relay rule that led to the content rule, if any
    pub relayed_by: Option<RuleName>,
    /// Lossy UTF-8 excerpt around a content match
    pub context: Option<String>,
}

impl ScanResult {
    /// Result for a rule that matched on metadata.
    #[must_use]
    pub fn matched(descriptor: FileDescriptor, rule: &Rule) -> Self {
        Self {
            descriptor,
            rule_name: rule.name().clone(),
            triage: rule.triage(),
            action: Some(rule.action()),
            relayed_by: None,
            context: None,
        }
    }

    /// Result for a content rule reached through a relay.
    #[must_use]
    pub fn relayed(
        descriptor: FileDescriptor,
        relay: &Rule,
        target: &Rule,
        context: Option<String>,
    ) -> Self {
        Self {
            descriptor,
            rule_name: target.name().clone(),
            triage: target.triage(),
            action: Some(target.action()),
            relayed_by: Some(relay.name().clone()),
            context,
        }
    }

    /// Synthetic result for an archive that could not be inspected because
    /// of encryption.
    #[must_use]
    pub fn encrypted_archive(archive: &Path) -> Self {
        Self {
            descriptor: FileDescriptor::path(archive),
            rule_name: ENCRYPTED_ARCHIVE_NAME.clone(),
            triage: Triage::HIGHEST,
            action: None,
            relayed_by: None,
            context: None,
        }
    }

    /// Whether this is the reserved encryption result.
    #[must_use]
    pub fn is_encrypted_archive(&self) -> bool {
        self.action.is_none() && self.rule_name.as_str() == ENCRYPTED_ARCHIVE_RULE
    }
}
