//! Archive classifier: member enumeration and the relay protocol.

use super::{ArchiveKind, ArchiveStream};
use crate::content::ContentMatcher;
use crate::error::{panic_message, ArchiveError};
use crate::location::matches_location;
use crate::result::ScanResult;
use crate::scratch::{ScratchArea, ScratchExtraction};
use crate::sink::Sink;
use std::ops::ControlFlow;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;
use trawl_core::{EngineConfig, FileDescriptor};
use trawl_rules::{Action, Rule, RuleSet};

/// Classifies the members of containers.
///
/// Shareable across worker threads; every call is independent and
/// synchronous.
#[derive(Debug, Clone)]
pub struct ArchiveScanner {
    rules: Arc<RuleSet>,
    content: ContentMatcher,
    scratch: ScratchArea,
    sink: Sink,
    max_members: usize,
    max_extract_bytes: u64,
}

impl ArchiveScanner {
    /// Create a scanner over a shared rule set.
    #[must_use]
    pub fn new(rules: Arc<RuleSet>, config: &EngineConfig, sink: Sink) -> Self {
        Self {
            rules,
            content: ContentMatcher::new(&config.limits),
            scratch: ScratchArea::new(config.unpack_dir()),
            sink,
            max_members: config.limits.max_archive_members,
            max_extract_bytes: config.limits.max_extract_bytes,
        }
    }

    /// Scratch area used for relay extractions.
    #[must_use]
    pub fn scratch(&self) -> &ScratchArea {
        &self.scratch
    }

    /// Scan every member of the container at `path`, detecting its format.
    ///
    /// Returns `true` iff at least one member matched. Unrecognized or
    /// unreadable containers are traced and count as no match.
    pub fn scan_archive(&self, path: &Path) -> bool {
        match ArchiveKind::detect(path) {
            Some(kind) => self.scan_archive_as(path, kind),
            None => {
                self.sink
                    .trace(format!("unrecognized container format: {}", path.display()));
                false
            }
        }
    }

    /// Scan every member of a container of a known format.
    pub fn scan_archive_as(&self, path: &Path, kind: ArchiveKind) -> bool {
        let mut stream = match ArchiveStream::open(path, kind) {
            Ok(stream) => stream,
            Err(e) if e.is_encryption() => {
                self.sink.result(ScanResult::encrypted_archive(path));
                return false;
            }
            Err(e) => {
                self.sink
                    .trace(format!("failed to open archive {}: {e}", path.display()));
                return false;
            }
        };

        let mut matched = false;
        let mut scanned = 0usize;

        let outcome = stream.for_each_member(|entry| {
            if entry.is_dir {
                return ControlFlow::Continue(());
            }
            if scanned >= self.max_members {
                self.sink.trace(format!(
                    "member limit of {} reached, skipping the rest of {}",
                    self.max_members,
                    path.display()
                ));
                return ControlFlow::Break(());
            }
            scanned += 1;

            let descriptor = FileDescriptor::member(path, entry.key);
            let attempt =
                panic::catch_unwind(AssertUnwindSafe(|| self.scan_member(&descriptor, path, kind)));
            match attempt {
                Ok(hit) => matched |= hit,
                Err(payload) => self.sink.error(format!(
                    "panic while scanning {descriptor}: {}",
                    panic_message(payload.as_ref())
                )),
            }

            ControlFlow::Continue(())
        });

        if let Err(e) = outcome {
            self.sink.trace(format!(
                "enumeration of {} stopped early: {e}",
                path.display()
            ));
        }

        debug!(archive = %path.display(), members = scanned, matched, "archive scanned");
        matched
    }

    /// Evaluate the rule list against one member, in configured order.
    ///
    /// The first rule that fires wins. Relay rules extract the member to
    /// scratch, run their target content rule and delete the copy whatever
    /// the outcome.
    pub fn scan_member(&self, descriptor: &FileDescriptor, archive: &Path, kind: ArchiveKind) -> bool {
        let FileDescriptor::ArchiveMember { key, .. } = descriptor else {
            self.sink
                .trace(format!("{descriptor} is not an archive member, skipped"));
            return false;
        };

        for rule in self.rules.top_level() {
            if !matches_location(rule, descriptor) {
                continue;
            }

            match rule.action() {
                Action::Keep | Action::Discard => {
                    self.sink
                        .result(ScanResult::matched(descriptor.clone(), rule));
                    return true;
                }
                Action::Relay => {
                    if self.relay(rule, descriptor, archive, kind, key) {
                        return true;
                    }
                }
            }
        }

        false
    }

    fn relay(
        &self,
        relay: &Rule,
        descriptor: &FileDescriptor,
        archive: &Path,
        kind: ArchiveKind,
        key: &str,
    ) -> bool {
        let target = match self.rules.relay_target(relay) {
            Ok(target) => target,
            Err(issue) => {
                self.sink.error(format!("configuration error: {issue}"));
                return false;
            }
        };

        let mut scratch = match self.scratch.create(archive, key) {
            Ok(scratch) => scratch,
            Err(e) => {
                self.sink.trace(format!(
                    "cannot create scratch file for {descriptor}: {e}"
                ));
                return false;
            }
        };

        if let Err(e) = self.extract(&mut scratch, archive, kind, key) {
            if e.is_encryption() {
                self.sink.result(ScanResult::encrypted_archive(archive));
            } else {
                self.sink
                    .trace(format!("failed to extract {descriptor}: {e}"));
            }
            return false;
        }

        match self.content.matches(target, scratch.path(), &self.sink) {
            Some(found) => {
                self.sink.result(ScanResult::relayed(
                    descriptor.clone(),
                    relay,
                    target,
                    Some(found.context),
                ));
                true
            }
            None => false,
        }
        // `scratch` drops here and removes the copy on both branches
    }

    fn extract(
        &self,
        scratch: &mut ScratchExtraction,
        archive: &Path,
        kind: ArchiveKind,
        key: &str,
    ) -> Result<u64, ArchiveError> {
        let mut stream = ArchiveStream::open(archive, kind)?;
        let written = stream.extract_member(key, scratch.writer()?, self.max_extract_bytes)?;
        scratch.close()?;
        Ok(written)
    }
}
