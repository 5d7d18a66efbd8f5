//! Configuration management for Trawl.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main engine configuration.
///
/// This is loaded from `~/.config/trawl/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Scratch extraction settings
    pub scratch: ScratchConfig,
    /// Resource ceilings applied per classification call
    pub limits: LimitsConfig,
    /// Rule definition settings
    pub rules: RulesConfig,
}

impl EngineConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.display().to_string(),
            });
        }

        tracing::debug!("Loading config from {}", path.display());
        let contents = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `TRAWL_UNPACK_DIR`: Override the scratch extraction root
    /// - `TRAWL_MAX_CONTENT_BYTES`: Override the content read ceiling
    /// - `TRAWL_MAX_EXTRACT_BYTES`: Override the per-member extraction ceiling
    /// - `TRAWL_MAX_ARCHIVE_MEMBERS`: Override the per-archive member cap
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply `TRAWL_*` environment overrides in place.
    ///
    /// Unparsable values are ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("TRAWL_UNPACK_DIR") {
            if !val.is_empty() {
                tracing::debug!("Override scratch.unpack_dir from env: {}", val);
                self.scratch.unpack_dir = Some(PathBuf::from(val));
            }
        }

        if let Ok(val) = std::env::var("TRAWL_MAX_CONTENT_BYTES") {
            if let Ok(bytes) = val.parse() {
                self.limits.max_content_bytes = bytes;
                tracing::debug!("Override limits.max_content_bytes from env: {}", bytes);
            }
        }

        if let Ok(val) = std::env::var("TRAWL_MAX_EXTRACT_BYTES") {
            if let Ok(bytes) = val.parse() {
                self.limits.max_extract_bytes = bytes;
                tracing::debug!("Override limits.max_extract_bytes from env: {}", bytes);
            }
        }

        if let Ok(val) = std::env::var("TRAWL_MAX_ARCHIVE_MEMBERS") {
            if let Ok(members) = val.parse() {
                self.limits.max_archive_members = members;
                tracing::debug!("Override limits.max_archive_members from env: {}", members);
            }
        }
    }

    /// Check value ranges.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.limits.max_content_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "limits.max_content_bytes".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        if self.limits.max_extract_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "limits.max_extract_bytes".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        if self.limits.max_archive_members == 0 {
            return Err(ConfigError::InvalidValue {
                field: "limits.max_archive_members".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        if let Some(dir) = &self.scratch.unpack_dir {
            if dir.as_os_str().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "scratch.unpack_dir".to_string(),
                    reason: "cannot be empty".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/trawl/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("com", "trawl", "trawl").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Get the cache directory path.
    ///
    /// Uses XDG base directories: `~/.cache/trawl`
    pub fn cache_dir() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("com", "trawl", "trawl").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.cache_dir().to_path_buf())
    }

    /// Root directory for scratch extractions.
    ///
    /// Uses `scratch.unpack_dir` when set, otherwise `<cache dir>/unpack`,
    /// otherwise `<system temp>/trawl-unpack`.
    #[must_use]
    pub fn unpack_dir(&self) -> PathBuf {
        if let Some(dir) = &self.scratch.unpack_dir {
            return dir.clone();
        }

        match Self::cache_dir() {
            Ok(cache) => cache.join("unpack"),
            Err(_) => std::env::temp_dir().join("trawl-unpack"),
        }
    }
}

/// Scratch extraction settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScratchConfig {
    /// Root of the scratch tree (defaults to the XDG cache directory)
    pub unpack_dir: Option<PathBuf>,
}

/// Per-call resource ceilings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Largest file the content matcher will read, in bytes
    pub max_content_bytes: u64,
    /// Largest archive member that will be extracted for inspection, in bytes
    pub max_extract_bytes: u64,
    /// Members enumerated per archive before the rest are skipped
    pub max_archive_members: usize,
    /// Bytes of surrounding content kept in a result's context snippet
    pub context_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_content_bytes: 10 * 1024 * 1024,  // 10 MB
            max_extract_bytes: 100 * 1024 * 1024, // 100 MB
            max_archive_members: 100_000,
            context_bytes: 64,
        }
    }
}

/// Rule definition settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Directory of `*.toml` rule files
    pub rules_dir: Option<PathBuf>,
}
