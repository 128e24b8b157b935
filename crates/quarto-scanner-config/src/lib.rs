use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Per-boundary budget the host parser gives the scanner for its state.
pub const SERIALIZATION_BUFFER_SIZE: usize = 1024;

/// Bytes taken by the codec header plus the optional partial-run block.
pub const STATE_OVERHEAD: usize = 12 + 8;

/// Bytes taken by one serialized open-delimiter record.
pub const RECORD_SIZE: usize = 8;

/// Deepest stack that still fits [`SERIALIZATION_BUFFER_SIZE`].
pub const MAX_SERIALIZABLE_DEPTH: usize =
    (SERIALIZATION_BUFFER_SIZE - STATE_OVERHEAD) / RECORD_SIZE;

/// Characters a backslash may escape by default (the ASCII punctuation set).
pub const DEFAULT_ESCAPABLE: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {source}")]
    ConfigParseError { source: toml::de::Error },

    #[error("Invalid config value for `{field}`: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Delimiter runs longer than this are literal text.
    pub max_run_length: usize,
    /// Openers beyond this stack depth are literal text.
    pub max_nesting_depth: usize,
    /// Underscores inside a word neither open nor close spans.
    pub intraword_underscore: bool,
    /// Fold blank lines into the preceding `line_end`.
    pub collapse_blank_lines: bool,
    /// Characters that `\` turns into literals.
    pub escapable: String,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            max_run_length: 3,
            max_nesting_depth: 64,
            intraword_underscore: true,
            collapse_blank_lines: true,
            escapable: DEFAULT_ESCAPABLE.to_string(),
        }
    }
}

impl ScannerConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: ScannerConfig =
            toml::from_str(content).map_err(|source| ConfigError::ConfigParseError { source })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        Self::from_toml_str(&content).map(Some)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    /// Checks the limits the scanner relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=3).contains(&self.max_run_length) {
            return Err(ConfigError::InvalidValue {
                field: "max_run_length",
                reason: format!("{} is outside 1..=3", self.max_run_length),
            });
        }
        if self.max_nesting_depth > MAX_SERIALIZABLE_DEPTH {
            return Err(ConfigError::InvalidValue {
                field: "max_nesting_depth",
                reason: format!(
                    "{} exceeds the {} entries that fit in the state buffer",
                    self.max_nesting_depth, MAX_SERIALIZABLE_DEPTH
                ),
            });
        }
        if let Some(c) = self.escapable.chars().find(|c| !c.is_ascii_punctuation()) {
            return Err(ConfigError::InvalidValue {
                field: "escapable",
                reason: format!("{c:?} is not ASCII punctuation"),
            });
        }
        Ok(())
    }

    /// Returns true if `\` followed by `byte` is an escape.
    pub fn is_escapable(&self, byte: u8) -> bool {
        byte.is_ascii_punctuation() && self.escapable.as_bytes().contains(&byte)
    }
}
