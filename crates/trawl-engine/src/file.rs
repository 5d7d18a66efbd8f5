//! Plain file classifier.

use crate::content::ContentMatcher;
use crate::location::matches_location;
use crate::result::ScanResult;
use crate::sink::Sink;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use trawl_core::{EngineConfig, FileDescriptor};
use trawl_rules::{Action, RuleSet};

/// Classifies ordinary files on disk.
#[derive(Debug, Clone)]
pub struct FileClassifier {
    rules: Arc<RuleSet>,
    content: ContentMatcher,
    sink: Sink,
}

impl FileClassifier {
    /// Create a classifier over a shared rule set.
    #[must_use]
    pub fn new(rules: Arc<RuleSet>, config: &EngineConfig, sink: Sink) -> Self {
        Self {
            rules,
            content: ContentMatcher::new(&config.limits),
            sink,
        }
    }

    /// Evaluate the rule list against one file, in configured order.
    ///
    /// The first rule that fires is reported and stops evaluation, so an
    /// earlier Discard suppresses a later Keep. Relay rules apply their
    /// target directly to the file; nothing is extracted. Access failures
    /// are traced and count as no match.
    pub fn classify(&self, path: &Path) -> bool {
        match fs::metadata(path) {
            Ok(metadata) if metadata.is_file() => {}
            Ok(_) => {
                self.sink
                    .trace(format!("not a regular file: {}", path.display()));
                return false;
            }
            Err(e) => {
                self.sink
                    .trace(format!("cannot access {}: {e}", path.display()));
                return false;
            }
        }

        let descriptor = FileDescriptor::path(path);

        for rule in self.rules.top_level() {
            if !matches_location(rule, &descriptor) {
                continue;
            }

            match rule.action() {
                Action::Keep | Action::Discard => {
                    self.sink.result(ScanResult::matched(descriptor, rule));
                    return true;
                }
                Action::Relay => {
                    let target = match self.rules.relay_target(rule) {
                        Ok(target) => target,
                        Err(issue) => {
                            self.sink.error(format!("configuration error: {issue}"));
                            continue;
                        }
                    };

                    if let Some(found) = self.content.matches(target, path, &self.sink) {
                        self.sink.result(ScanResult::relayed(
                            descriptor,
                            rule,
                            target,
                            Some(found.context),
                        ));
                        return true;
                    }
                }
            }
        }

        false
    }
}
