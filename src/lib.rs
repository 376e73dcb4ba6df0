//! chronosort - merge photos from several cameras into one timeline
//!
//! This library provides the pieces of the sorting pipeline:
//! - EXIF capture time and camera model extraction
//! - Grouping of photos by camera model
//! - Per-camera clock offset correction
//! - Stable chronological sorting
//! - Copying into an output folder under ranked names (1.jpg, 2.jpg, ...)

pub mod cli;
pub mod config;
pub mod copy;
pub mod error;
pub mod metadata;
pub mod normalize;
pub mod partition;
pub mod process;
pub mod record;
pub mod sort;

pub use cli::{Cli, Command};
pub use config::{Config, ConfigError, MissingMetadataPolicy};
pub use copy::{CopyPlan, copy_renamed, plan_copies};
pub use error::{Error, Result};
pub use metadata::{CaptureMetadata, camera_name, extract};
pub use normalize::{normalize_from_config, normalize_to_reference, shift};
pub use partition::{Partitions, partition};
pub use process::{LoadedRecords, Organizer, RunSummary};
pub use record::ImageRecord;
pub use sort::sort_by_time;
