//! Engine entry point: routes discovered objects to the right classifier.

use crate::archive::{ArchiveKind, ArchiveScanner};
use crate::error::panic_message;
use crate::file::FileClassifier;
use crate::sink::Sink;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use trawl_core::EngineConfig;
use trawl_rules::RuleSet;

/// Kind hint supplied by the crawl.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// Ordinary file, classified on its own metadata
    File,
    /// Container whose members are classified
    Container,
}

impl ObjectKind {
    /// Guess the kind from the extension, then the leading bytes.
    #[must_use]
    pub fn detect(path: &Path) -> Self {
        if ArchiveKind::detect(path).is_some() {
            Self::Container
        } else {
            Self::File
        }
    }
}

/// A filesystem object handed over by the crawl.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredObject {
    /// Location on disk
    pub path: PathBuf,
    /// File or container
    pub kind: ObjectKind,
}

impl DiscoveredObject {
    /// Object with an explicit kind.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, kind: ObjectKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// Object whose kind is detected from the path and header.
    #[must_use]
    pub fn detect(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let kind = ObjectKind::detect(&path);
        Self { path, kind }
    }
}

/// Classification engine.
///
/// Holds one classifier per object kind over a shared, immutable rule set.
/// `Engine` is `Send + Sync`; wrap it in an `Arc` and call
/// [`classify`](Self::classify) from as many workers as needed.
#[derive(Debug, Clone)]
pub struct Engine {
    files: FileClassifier,
    archives: ArchiveScanner,
    sink: Sink,
}

impl Engine {
    /// Build an engine.
    #[must_use]
    pub fn new(config: &EngineConfig, rules: Arc<RuleSet>, sink: Sink) -> Self {
        info!(
            rules = rules.len(),
            unpack_dir = %config.unpack_dir().display(),
            "classification engine ready"
        );

        Self {
            files: FileClassifier::new(Arc::clone(&rules), config, sink.clone()),
            archives: ArchiveScanner::new(rules, config, sink.clone()),
            sink,
        }
    }

    /// Classify one discovered object.
    ///
    /// Never fails and never panics: unexpected failures are reported to the
    /// sink as errors and count as no match.
    pub fn classify(&self, object: &DiscoveredObject) -> bool {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| match object.kind {
            ObjectKind::File => self.files.classify(&object.path),
            ObjectKind::Container => self.archives.scan_archive(&object.path),
        }));

        outcome.unwrap_or_else(|payload| {
            self.sink.error(format!(
                "unexpected failure classifying {}: {}",
                object.path.display(),
                panic_message(payload.as_ref())
            ));
            false
        })
    }

    /// Classify a path, detecting whether it is a container.
    pub fn classify_path(&self, path: &Path) -> bool {
        self.classify(&DiscoveredObject::detect(path))
    }

    /// Plain file classifier.
    #[must_use]
    pub fn files(&self) -> &FileClassifier {
        &self.files
    }

    /// Archive classifier.
    #[must_use]
    pub fn archives(&self) -> &ArchiveScanner {
        &self.archives
    }
}
