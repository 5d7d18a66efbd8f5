//! Trawl Core - Foundation crate for the Trawl sensitive-data scanner.
//!
//! This crate provides shared types, error handling, configuration management,
//! and logging setup that the rule and engine crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based engine configuration with XDG paths
//! - [`types`] - Shared newtypes and enums (`RuleName`, `Triage`, `FileDescriptor`)
//! - [`logging`] - `tracing-subscriber` initialization
//!
//! # Example
//!
//! ```rust
//! use std::path::PathBuf;
//! use trawl_core::{EngineConfig, FileDescriptor, Triage};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = EngineConfig::default();
//! config.validate()?;
//!
//! let member = FileDescriptor::member(PathBuf::from("/shares/backup.zip"), "etc/passwd");
//! assert_eq!(member.name(), "passwd");
//! assert!(Triage::Black > Triage::Green);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use config::{EngineConfig, LimitsConfig, RulesConfig, ScratchConfig};
pub use error::{ConfigError, ConfigResult, TrawlError};
pub use types::{FileDescriptor, RuleName, Triage};
