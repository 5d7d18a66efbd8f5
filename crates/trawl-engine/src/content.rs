//! Content matching on files materialized on disk.

use crate::sink::Sink;
use std::fs::{self, File};
use std::io::Read;
use std::ops::Range;
use std::path::Path;
use trawl_core::LimitsConfig;
use trawl_rules::Rule;

/// Longest matched span copied into a context snippet.
const MAX_MATCH_EXCERPT: usize = 256;

/// A successful content match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentMatch {
    /// Lossy UTF-8 excerpt around the first match
    pub context: String,
}

/// Applies content rules to real files, bounded by a size ceiling.
#[derive(Debug, Clone)]
pub struct ContentMatcher {
    max_bytes: u64,
    context_bytes: usize,
}

impl ContentMatcher {
    /// Create a matcher from the configured limits.
    #[must_use]
    pub fn new(limits: &LimitsConfig) -> Self {
        Self {
            max_bytes: limits.max_content_bytes,
            context_bytes: limits.context_bytes,
        }
    }

    /// Largest file this matcher will read.
    #[must_use]
    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Apply `rule` to the bytes of the file at `path`.
    ///
    /// Fails soft: missing, unreadable or oversized files are reported to the
    /// sink as trace diagnostics and count as no match.
    pub fn matches(&self, rule: &Rule, path: &Path, sink: &Sink) -> Option<ContentMatch> {
        // Check file size before reading
        let metadata = match fs::metadata(path) {
            Ok(m) => m,
            Err(e) => {
                sink.trace(format!(
                    "failed to read metadata for {}: {e}",
                    path.display()
                ));
                return None;
            }
        };

        if !metadata.is_file() {
            sink.trace(format!("not a regular file: {}", path.display()));
            return None;
        }

        if metadata.len() > self.max_bytes {
            sink.trace(format!(
                "skipping large file ({} bytes, limit {}): {}",
                metadata.len(),
                self.max_bytes,
                path.display()
            ));
            return None;
        }

        let contents = match read_bounded(path, self.max_bytes) {
            Ok(contents) => contents,
            Err(e) => {
                sink.trace(format!("failed to read file {}: {e}", path.display()));
                return None;
            }
        };

        rule.find(&contents).map(|range| ContentMatch {
            context: excerpt(&contents, range, self.context_bytes),
        })
    }
}

fn read_bounded(path: &Path, max_bytes: u64) -> std::io::Result<Vec<u8>> {
    let mut contents = Vec::new();
    File::open(path)?.take(max_bytes).read_to_end(&mut contents)?;
    Ok(contents)
}

fn excerpt(contents: &[u8], range: Range<usize>, context_bytes: usize) -> String {
    let match_end = range.end.min(range.start + MAX_MATCH_EXCERPT);
    let start = range.start.saturating_sub(context_bytes);
    let end = match_end.saturating_add(context_bytes).min(contents.len());
    String::from_utf8_lossy(&contents[start..end]).into_owned()
}
