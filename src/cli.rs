//! CLI argument parsing with clap

use crate::config::{Config, ConfigError, MissingMetadataPolicy};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// chronosort - merge photos from several cameras into one timeline
///
/// Reads the capture time and camera model of every photo in the input
/// folder, corrects per-camera clock offsets, and copies the photos to the
/// output folder as 1.jpg, 2.jpg, ... in chronological order.
#[derive(Parser, Debug)]
#[command(name = "chronosort")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to configuration file (TOML format)
    #[arg(short = 'C', long, global = true, env = "CHRONOSORT_CONFIG", default_value = "config.toml")]
    pub config: PathBuf,

    /// Input folder, overrides `main.input_path`
    #[arg(short, long, global = true)]
    pub input: Option<PathBuf>,

    /// Output folder, overrides `main.output_path`
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Output file extension, overrides `main.extension`
    #[arg(short, long, global = true)]
    pub extension: Option<String>,

    /// Handling of images without capture time or camera model
    #[arg(long, value_enum, global = true)]
    pub missing_metadata: Option<MissingMetadataPolicy>,

    /// Dry run mode - show the renames without copying
    #[arg(short = 'n', long, global = true)]
    pub dry_run: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Write the log file as JSON
    #[arg(long, global = true)]
    pub json_log: bool,

    /// Also write logs to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Print the camera models found in the input folder, copy nothing
    Models,
    /// Print a sample configuration file
    SampleConfig,
}

impl Cli {
    /// Load the configuration file and apply CLI overrides.
    ///
    /// Without a configuration file, input, output and extension must all
    /// be given on the command line.
    pub fn load_config(&self) -> Result<Config, ConfigError> {
        let path = resolve_config_path(&self.config);

        let config = if path.exists() {
            Config::load_from_file(&path)?
        } else if let (Some(input), Some(output), Some(extension)) =
            (&self.input, &self.output, &self.extension)
        {
            Config::new(input, output, extension)
        } else {
            // Surfaces the read error for the missing file
            Config::load_from_file(&path)?
        };

        self.merge_with_config(config)
    }

    /// Merge CLI arguments with config from file.
    /// CLI arguments take precedence over config file settings.
    pub fn merge_with_config(&self, mut config: Config) -> Result<Config, ConfigError> {
        if let Some(ref input) = self.input {
            config.main.input_path = input.clone();
        }
        if let Some(ref output) = self.output {
            config.main.output_path = output.clone();
        }
        if let Some(ref extension) = self.extension {
            config.main.extension = extension.clone();
        }
        if let Some(policy) = self.missing_metadata {
            config.main.missing_metadata = policy;
        }
        if self.dry_run {
            config.main.dry_run = true;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Resolve config path, trying a `.toml` extension when none is given
fn resolve_config_path(config_path: &Path) -> PathBuf {
    if config_path.exists() || config_path.extension().is_some() {
        return config_path.to_path_buf();
    }

    let with_extension = config_path.with_extension("toml");
    if with_extension.exists() {
        return with_extension;
    }

    config_path.to_path_buf()
}
