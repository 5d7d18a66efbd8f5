//! Location matching: rules evaluated on names, extensions and paths.

use trawl_core::FileDescriptor;
use trawl_rules::{Location, Rule};

/// Apply a rule's predicate to the descriptor property selected by its
/// location.
///
/// Pure string inspection; never touches disk, so real files and synthetic
/// archive members behave the same. `ByContent` rules never match here.
#[must_use]
pub fn matches_location(rule: &Rule, descriptor: &FileDescriptor) -> bool {
    match rule.location() {
        Location::ByExtension => descriptor
            .extension()
            .is_some_and(|ext| rule.is_match(ext.as_bytes())),
        Location::ByName => rule.is_match(descriptor.name().as_bytes()),
        Location::ByPath => rule.is_match(descriptor.full_path().as_bytes()),
        Location::ByContent => false,
    }
}
