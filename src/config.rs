//! Configuration types for chronosort

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// What to do with a readable image whose capture metadata is missing or unparsable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MissingMetadataPolicy {
    /// Abort the run, naming the file and the missing field
    #[default]
    Fail,
    /// Log a warning and leave the file out of the sequence
    Skip,
}

/// The `[main]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MainSection {
    /// Folder whose files are sorted (not traversed recursively)
    pub input_path: PathBuf,

    /// Folder receiving the renamed copies, must already exist
    pub output_path: PathBuf,

    /// Extension given to every output file, without the leading dot
    pub extension: String,

    /// Handling of images without usable capture metadata
    #[serde(default)]
    pub missing_metadata: MissingMetadataPolicy,

    /// Dry run mode - plan the renames without copying anything
    #[serde(default)]
    pub dry_run: bool,
}

/// Configuration for chronosort
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub main: MainSection,

    /// Per-camera clock offsets in seconds, keyed by case-folded camera model
    #[serde(default)]
    pub normalize: BTreeMap<String, i64>,
}

impl Config {
    /// Build a configuration directly, with no clock offsets
    pub fn new(
        input_path: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
        extension: impl Into<String>,
    ) -> Self {
        Self {
            main: MainSection {
                input_path: input_path.into(),
                output_path: output_path.into(),
                extension: extension.into(),
                missing_metadata: MissingMetadataPolicy::default(),
                dry_run: false,
            },
            normalize: BTreeMap::new(),
        }
    }

    pub fn input_path(&self) -> &Path {
        &self.main.input_path
    }

    pub fn output_path(&self) -> &Path {
        &self.main.output_path
    }

    pub fn extension(&self) -> &str {
        &self.main.extension
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::from_toml_str(&content, path)
    }

    /// Parse configuration text; `path` is only used for error messages
    pub fn from_toml_str(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let mut config: Config = toml::from_str(content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        // Camera keys are compared case-folded
        let mut normalize = BTreeMap::new();
        for (model, offset) in std::mem::take(&mut config.normalize) {
            let key = model.to_lowercase();
            if normalize.insert(key.clone(), offset).is_some() {
                return Err(ConfigError::InvalidValue {
                    key: "normalize",
                    message: format!("camera '{}' is listed more than once", key),
                });
            }
        }
        config.normalize = normalize;

        config.validate()?;
        Ok(config)
    }

    /// Check values that deserialization alone cannot reject
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        let extension = self.main.extension.trim();
        let extension = extension.strip_prefix('.').unwrap_or(extension);
        if extension.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "main.extension",
                message: "must not be empty".to_string(),
            });
        }
        self.main.extension = extension.to_string();

        if self.main.input_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "main.input_path",
                message: "must not be empty".to_string(),
            });
        }
        if self.main.output_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "main.output_path",
                message: "must not be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Generate a sample configuration file content
    pub fn sample_config() -> String {
        r#"# chronosort configuration file
# This file uses TOML format (https://toml.io)

[main]
# Folder holding the photos to sort (subfolders are ignored)
input_path = "D:/Photos/Trip"

# Folder receiving 1.jpg, 2.jpg, ... in chronological order (must exist)
output_path = "D:/Sorted/Trip"

# Extension of the output files, without the dot
extension = "jpg"

# Images lacking a capture time or camera model:
# - fail: stop and report the file (default)
# - skip: warn and leave the file out
missing_metadata = "fail"

# Dry run mode - show the renames without copying
dry_run = false

# Clock offsets in seconds, one entry per camera model.
# Run `chronosort models` to list the camera keys found in input_path.
[normalize]
"nikon d50" = -50
"canon eos 5d" = 3600
"#
        .to_string()
    }
}

/// Errors that can occur when loading configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read configuration file
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to parse configuration file (including missing required keys)
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// A value parsed but is not acceptable
    InvalidValue { key: &'static str, message: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError { path, source } => {
                write!(f, "Failed to read config file '{}': {}", path.display(), source)
            }
            ConfigError::ParseError { path, source } => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), source)
            }
            ConfigError::InvalidValue { key, message } => {
                write!(f, "Invalid value for '{}': {}", key, message)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::ReadError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
            ConfigError::InvalidValue { .. } => None,
        }
    }
}
