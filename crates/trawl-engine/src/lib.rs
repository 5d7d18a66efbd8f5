//! Trawl Engine - Classification and archive recursion.
//!
//! Given files and containers discovered by an outer crawl, the engine decides
//! which objects are interesting according to an ordered [`RuleSet`], reports
//! each match with its triage level, and recurses into archives. Relay rules
//! extract a candidate member to a scratch location, run a content rule on it
//! and always delete the copy afterwards.
//!
//! Every observation goes to a [`Sink`] as a [`SinkMessage`]; the only value
//! returned synchronously is whether the object contained anything
//! interesting. No single file, member or archive can abort a scan: errors are
//! turned into diagnostics at the smallest enclosing boundary.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use trawl_core::EngineConfig;
//! use trawl_engine::{sink, Engine};
//! use trawl_rules::RuleLoader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = EngineConfig::load_with_env()?;
//! let rules = Arc::new(RuleLoader::with_default_dir()?.load_rule_set()?);
//! let (sink, mut receiver) = sink::channel();
//!
//! let engine = Engine::new(&config, rules, sink);
//! engine.classify_path(Path::new("/srv/share/backup.zip"));
//!
//! for message in receiver.drain() {
//!     println!("{message:?}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! [`RuleSet`]: trawl_rules::RuleSet

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod archive;
pub mod content;
pub mod engine;
pub mod error;
pub mod file;
pub mod location;
pub mod result;
pub mod scratch;
pub mod sink;

// Re-export main types
pub use archive::{ArchiveKind, ArchiveScanner, ArchiveStream, MemberEntry};
pub use content::{ContentMatch, ContentMatcher};
pub use engine::{DiscoveredObject, Engine, ObjectKind};
pub use error::{ArchiveError, Result};
pub use file::FileClassifier;
pub use location::matches_location;
pub use result::{ScanResult, ENCRYPTED_ARCHIVE_RULE};
pub use scratch::{ScratchArea, ScratchExtraction};
pub use sink::{Diagnostic, DiagnosticLevel, Sink, SinkMessage, SinkReceiver};
