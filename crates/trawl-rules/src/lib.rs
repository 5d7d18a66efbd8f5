//! Trawl Rules - Classifier rule definitions for the Trawl scanner.
//!
//! This crate provides the rule model the classification engine evaluates:
//! strongly-typed definitions loaded from TOML, compiled match predicates,
//! and an immutable, ordered rule set with relay-chain checks.
//!
//! # Architecture
//!
//! - **Definition Types** ([`definition`]): Rule metadata and the closed `Action` / `Location` / `Scope` / `MatchKind` enums
//! - **Compiled Rules** ([`rule`]): Definitions with their word lists compiled to byte regexes
//! - **Rule Set** ([`set`]): Ordered, name-indexed rule collection and relay resolution
//! - **Loader** ([`loader`]): TOML file loading from a `rule-definitions/` directory
//! - **Errors** ([`error`]): Rule-specific error types
//!
//! # Example
//!
//! ```rust
//! use trawl_rules::RuleSet;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let rules = RuleSet::from_toml_str(
//!     r#"
//! [[rule]]
//! name = "KeepKeePass"
//! action = "keep"
//! location = "by-extension"
//! scope = "member-enumeration"
//! triage = "Black"
//! match_kind = "exact"
//! word_list = ["kdbx"]
//! "#,
//! )?;
//!
//! assert_eq!(rules.len(), 1);
//! assert!(rules.validate().is_empty());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod definition;
pub mod error;
pub mod loader;
pub mod rule;
pub mod set;

// Re-export commonly used types
pub use definition::{Action, Location, MatchKind, RuleDefinition, RuleFile, Scope};
pub use error::{RelayIssue, Result, RuleError};
pub use loader::RuleLoader;
pub use rule::Rule;
pub use set::RuleSet;
