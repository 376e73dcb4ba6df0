//! Capture metadata extraction
//!
//! Reads the capture time and camera identification from an image's EXIF
//! block. Files that are not images are reported with
//! [`Error::NotAnImage`] so the caller can skip them; images lacking a
//! required field are reported with [`Error::MissingMetadataField`].

pub mod exif;

use crate::error::{Error, Result};
use std::path::Path;
use tracing::debug;

/// Capture metadata of one image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureMetadata {
    /// Capture time in the EXIF textual form "YYYY:MM:DD HH:MM:SS"
    pub capture_time: String,
    /// Camera identification, vendor included exactly once
    pub camera_model: String,
}

/// Extract capture time and camera identification from an image file
pub fn extract(path: &Path) -> Result<CaptureMetadata> {
    let fields = exif::read_fields(path)?;

    let missing = |field: &'static str| Error::MissingMetadataField {
        path: path.to_path_buf(),
        field,
    };

    let capture_time = fields
        .date_time_original
        .ok_or_else(|| missing("DateTimeOriginal"))?;
    let make = fields.make.ok_or_else(|| missing("Make"))?;
    let model = fields.model.ok_or_else(|| missing("Model"))?;

    let camera_model = camera_name(&make, &model);
    debug!(?path, %capture_time, %camera_model, "Extracted capture metadata");

    Ok(CaptureMetadata {
        capture_time,
        camera_model,
    })
}

/// Assemble the camera name from the EXIF make and model.
///
/// Only the first space-delimited word of the make is used; it is prefixed
/// to the model unless the model already starts with it, so both
/// ("Canon", "Canon EOS 5D") and ("Canon", "EOS 5D") give "Canon EOS 5D".
pub fn camera_name(make: &str, model: &str) -> String {
    let vendor = make.split(' ').next().unwrap_or_default();
    if model.starts_with(vendor) {
        model.to_string()
    } else {
        format!("{} {}", vendor, model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_camera_name_no_duplicate_vendor() {
        assert_eq!(camera_name("Canon", "Canon EOS 5D"), "Canon EOS 5D");
        assert_eq!(camera_name("Canon", "EOS 5D"), "Canon EOS 5D");
    }

    #[test]
    fn test_camera_name_uses_first_word_of_make() {
        assert_eq!(camera_name("NIKON CORPORATION", "NIKON D50"), "NIKON D50");
        assert_eq!(camera_name("OLYMPUS IMAGING CORP.", "E-M5"), "OLYMPUS E-M5");
        // Prefix match is case-sensitive
        assert_eq!(camera_name("Apple", "apple phone"), "Apple apple phone");
    }

    #[test]
    fn test_extract() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.tif");
        super::exif::write_fixture(
            &path,
            Some("NIKON CORPORATION"),
            Some("D50"),
            Some("2024:03:02 08:00:00"),
        );

        let meta = extract(&path).unwrap();
        assert_eq!(meta.capture_time, "2024:03:02 08:00:00");
        assert_eq!(meta.camera_model, "NIKON D50");
    }

    #[test]
    fn test_extract_reports_missing_field() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.tif");
        super::exif::write_fixture(&path, Some("Canon"), Some("EOS 5D"), None);

        match extract(&path).unwrap_err() {
            Error::MissingMetadataField { path: p, field } => {
                assert_eq!(p, path);
                assert_eq!(field, "DateTimeOriginal");
            }
            other => panic!("unexpected error: {other}"),
        }

        super::exif::write_fixture(&path, None, Some("EOS 5D"), Some("2024:03:02 08:00:00"));
        let err = extract(&path).unwrap_err();
        assert!(matches!(err, Error::MissingMetadataField { field: "Make", .. }));
        assert!(err.is_missing_metadata());
    }
}
