//! Pipeline driver
//!
//! Handles the core flow of:
//! - Listing the files directly inside the input folder
//! - Extracting capture metadata and building image records
//! - Grouping by camera and applying configured clock offsets
//! - Sorting chronologically and copying under ranked names

use crate::config::{Config, MissingMetadataPolicy};
use crate::copy::{CopyPlan, copy_renamed, plan_copies};
use crate::error::{Error, Result};
use crate::metadata;
use crate::normalize::normalize_from_config;
use crate::partition::partition;
use crate::record::ImageRecord;
use crate::sort::sort_by_time;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::{Level, debug, info, span, warn};
use walkdir::WalkDir;

/// Records built from a scan, plus the files that produced none
#[derive(Debug, Clone, Default)]
pub struct LoadedRecords {
    pub records: Vec<ImageRecord>,
    /// Files that could not be read as images
    pub not_images: Vec<PathBuf>,
    /// Images skipped for missing or unparsable capture metadata
    pub incomplete: Vec<PathBuf>,
}

/// Outcome of a full run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Regular files found in the input folder
    pub scanned: usize,
    pub not_images: Vec<PathBuf>,
    pub incomplete: Vec<PathBuf>,
    /// Cameras named in `[normalize]` that took no picture in this run
    pub unknown_cameras: Vec<String>,
    /// Records in final chronological order
    pub sorted: Vec<ImageRecord>,
    /// Copies performed, or planned when `dry_run` is set
    pub copies: Vec<CopyPlan>,
    pub dry_run: bool,
}

/// Main driver for sorting a folder of photos
pub struct Organizer {
    config: Config,
}

impl Organizer {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Names of the regular files directly inside the input folder, sorted.
    ///
    /// Broken symlinks are skipped; any other traversal error aborts the scan.
    pub fn scan(&self) -> Result<Vec<OsString>> {
        let input_dir = self.config.input_path();
        if !input_dir.is_dir() {
            return Err(Error::InputDirectoryMissing(input_dir.to_path_buf()));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(input_dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if is_broken_link(&e) => {
                    warn!(path = ?e.path(), "Skipping broken symlink");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            if entry.file_type().is_file() {
                files.push(entry.file_name().to_os_string());
            }
        }

        debug!(count = files.len(), "Scanned input directory");
        Ok(files)
    }

    /// Build one record per readable image.
    ///
    /// Non-images are skipped. Images with missing metadata abort the load
    /// or are skipped, depending on the configured policy.
    pub fn load_records(&self, files: &[OsString]) -> Result<LoadedRecords> {
        let input_dir = self.config.input_path();
        let policy = self.config.main.missing_metadata;
        let mut loaded = LoadedRecords::default();

        for (sequence, filename) in files.iter().enumerate() {
            let path = input_dir.join(filename);
            let _file_span = span!(Level::DEBUG, "load_file", ?path).entered();

            let result = metadata::extract(&path).and_then(|meta| {
                ImageRecord::new(
                    filename.as_os_str(),
                    sequence,
                    &meta.capture_time,
                    meta.camera_model,
                )
            });

            match result {
                Ok(record) => loaded.records.push(record),
                Err(Error::NotAnImage { path, message }) => {
                    warn!(?path, %message, "Not found or not an image, skipping");
                    loaded.not_images.push(path);
                }
                Err(e) if e.is_missing_metadata() && policy == MissingMetadataPolicy::Skip => {
                    warn!(?path, error = %e, "Unusable capture metadata, skipping");
                    loaded.incomplete.push(path);
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            records = loaded.records.len(),
            not_images = loaded.not_images.len(),
            incomplete = loaded.incomplete.len(),
            "Loaded image records"
        );
        Ok(loaded)
    }

    /// Distinct camera keys found in the input folder
    pub fn models(&self) -> Result<Vec<String>> {
        let files = self.scan()?;
        let loaded = self.load_records(&files)?;
        let partitions = partition(loaded.records, false);
        Ok(partitions.camera_keys().map(str::to_string).collect())
    }

    /// Run the whole pipeline: normalize, sort, copy
    pub fn run(&self) -> Result<RunSummary> {
        let _span = span!(Level::INFO, "organizer_run").entered();

        let output_dir = self.config.output_path();
        if !output_dir.is_dir() {
            return Err(Error::OutputDirectoryMissing(output_dir.to_path_buf()));
        }

        info!(input = ?self.config.input_path(), "Scanning input directory...");
        let files = self.scan()?;
        info!(count = files.len(), "Found files");

        let loaded = self.load_records(&files)?;

        let mut partitions = partition(loaded.records, true);
        info!(cameras = partitions.len(), "Partitioned by camera");

        let unknown_cameras = normalize_from_config(&mut partitions, &self.config.normalize)?;

        let mut sorted = partitions.into_records();
        sort_by_time(&mut sorted);

        let dry_run = self.config.main.dry_run;
        let copies = if dry_run {
            info!("Dry run, nothing will be copied");
            plan_copies(
                &sorted,
                self.config.input_path(),
                output_dir,
                self.config.extension(),
            )
        } else {
            copy_renamed(
                &sorted,
                self.config.input_path(),
                output_dir,
                self.config.extension(),
            )?
        };

        Ok(RunSummary {
            scanned: files.len(),
            not_images: loaded.not_images,
            incomplete: loaded.incomplete,
            unknown_cameras,
            sorted,
            copies,
            dry_run,
        })
    }
}

/// An entry whose link target does not exist
fn is_broken_link(error: &walkdir::Error) -> bool {
    error
        .io_error()
        .is_some_and(|e| e.kind() == ErrorKind::NotFound)
}
