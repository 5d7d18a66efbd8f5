//! Shared types used across the Trawl scanner.
//!
//! This module defines common newtypes and enums that provide type safety
//! and clear domain modeling.

use crate::error::TrawlError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Newtype for rule identifiers with validation.
///
/// Rule names are 1-100 characters: ASCII alphanumerics plus `_`, `-` and `.`,
/// starting with an alphanumeric.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RuleName(String);

impl RuleName {
    /// Create a new `RuleName` from a string.
    ///
    /// # Errors
    /// Returns error if the name doesn't match the required format.
    pub fn new(name: impl Into<String>) -> Result<Self, TrawlError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(name: &str) -> Result<(), TrawlError> {
        static RULE_NAME_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = RULE_NAME_REGEX
            .get_or_init(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.-]*$").expect("valid regex"));

        if name.is_empty() || name.len() > 100 {
            return Err(TrawlError::Validation(format!(
                "invalid rule name: must be 1-100 characters, got {} characters",
                name.len()
            )));
        }

        if regex.is_match(name) {
            Ok(())
        } else {
            Err(TrawlError::Validation(format!(
                "invalid rule name: must be alphanumeric with '_', '-' or '.', got '{name}'"
            )))
        }
    }
}

impl TryFrom<String> for RuleName {
    type Error = TrawlError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RuleName> for String {
    fn from(name: RuleName) -> Self {
        name.0
    }
}

impl fmt::Display for RuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Severity attached to a match.
///
/// Ordered `Black > Red > Yellow > Green`. Used for downstream sorting and
/// display only; the engine never branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Triage {
    /// Low interest
    Green,
    /// Worth a look
    Yellow,
    /// Likely sensitive
    Red,
    /// Almost certainly sensitive (credentials, keys, encrypted containers)
    Black,
}

impl Triage {
    /// The most severe level.
    pub const HIGHEST: Triage = Triage::Black;

    /// Get a human-readable display name.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Green => "Green",
            Self::Yellow => "Yellow",
            Self::Red => "Red",
            Self::Black => "Black",
        }
    }
}

impl fmt::Display for Triage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Something to classify: a real path, or a member inside a container.
///
/// Location rules only ever look at [`name`](Self::name),
/// [`extension`](Self::extension) and [`full_path`](Self::full_path), so they
/// behave identically for both variants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FileDescriptor {
    /// A file on a real filesystem
    Path {
        /// Path of the file
        path: PathBuf,
    },
    /// A member of a container file
    ArchiveMember {
        /// Path of the containing archive
        archive: PathBuf,
        /// Member key as stored in the archive (`/`-separated)
        key: String,
    },
}

impl FileDescriptor {
    /// Descriptor for a real file.
    #[must_use]
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self::Path { path: path.into() }
    }

    /// Descriptor for an archive member.
    #[must_use]
    pub fn member(archive: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self::ArchiveMember {
            archive: archive.into(),
            key: key.into(),
        }
    }

    /// Final path component (file name).
    #[must_use]
    pub fn name(&self) -> Cow<'_, str> {
        match self {
            Self::Path { path } => path
                .file_name()
                .map_or(Cow::Borrowed(""), |name| name.to_string_lossy()),
            Self::ArchiveMember { key, .. } => {
                let trimmed = key.trim_end_matches(['/', '\\']);
                let name = trimmed.rsplit(['/', '\\']).next().unwrap_or(trimmed);
                Cow::Borrowed(name)
            }
        }
    }

    /// Extension of the file name without the leading dot.
    ///
    /// Dotfiles such as `.bashrc` have no extension.
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        let name = self.name();
        match name.rfind('.') {
            Some(idx) if idx > 0 && idx + 1 < name.len() => Some(name[idx + 1..].to_string()),
            _ => None,
        }
    }

    /// Full path string. Members are rendered as `<archive>/<key>`.
    #[must_use]
    pub fn full_path(&self) -> Cow<'_, str> {
        match self {
            Self::Path { path } => path.to_string_lossy(),
            Self::ArchiveMember { archive, key } => {
                Cow::Owned(format!("{}/{}", archive.display(), key))
            }
        }
    }

    /// The real file that backs this descriptor: the file itself, or the
    /// containing archive for members.
    #[must_use]
    pub fn backing_path(&self) -> &Path {
        match self {
            Self::Path { path } => path,
            Self::ArchiveMember { archive, .. } => archive,
        }
    }
}

impl fmt::Display for FileDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full_path())
    }
}
