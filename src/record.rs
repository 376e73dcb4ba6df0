//! Image records: one per successfully read input file

use crate::error::{Error, Result};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use std::ffi::{OsStr, OsString};

/// EXIF capture time format: "YYYY:MM:DD HH:MM:SS"
pub const CAPTURE_TIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// A photo with its capture instant and originating camera
///
/// The capture time and the timestamp always denote the same instant:
/// both are private and only change together through [`ImageRecord::shift`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    filename: OsString,
    sequence: usize,
    capture_time: NaiveDateTime,
    timestamp: i64,
    camera_model: String,
    camera_key: String,
}

impl ImageRecord {
    /// Create a record from the textual capture time read from metadata.
    ///
    /// `sequence` is the position of the file in scan order.
    pub fn new(
        filename: impl Into<OsString>,
        sequence: usize,
        capture_time: &str,
        camera_model: impl Into<String>,
    ) -> Result<Self> {
        let filename = filename.into();
        let timestamp = parse_capture_time(capture_time).ok_or_else(|| {
            Error::InvalidCaptureTime {
                filename: filename.to_string_lossy().into_owned(),
                value: capture_time.to_string(),
            }
        })?;
        Self::from_timestamp(filename, sequence, timestamp, camera_model)
    }

    /// Create a record from a timestamp in seconds
    pub fn from_timestamp(
        filename: impl Into<OsString>,
        sequence: usize,
        timestamp: i64,
        camera_model: impl Into<String>,
    ) -> Result<Self> {
        let camera_model = camera_model.into();
        let capture_time =
            local_time(timestamp).ok_or(Error::TimestampOutOfRange { timestamp, offset: 0 })?;

        Ok(Self {
            filename: filename.into(),
            sequence,
            capture_time,
            timestamp,
            camera_key: camera_key(&camera_model),
            camera_model,
        })
    }

    /// Source file name, not necessarily valid UTF-8
    pub fn filename(&self) -> &OsStr {
        &self.filename
    }

    /// Position of the source file in scan order
    pub fn sequence(&self) -> usize {
        self.sequence
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Local wall-clock capture time
    pub fn capture_time(&self) -> NaiveDateTime {
        self.capture_time
    }

    /// Capture time in the EXIF textual format
    pub fn capture_time_string(&self) -> String {
        self.capture_time.format(CAPTURE_TIME_FORMAT).to_string()
    }

    /// Camera identification as read from metadata
    pub fn camera_model(&self) -> &str {
        &self.camera_model
    }

    /// Case-folded camera model, the grouping key
    pub fn camera_key(&self) -> &str {
        &self.camera_key
    }

    /// Move the capture instant by `seconds`, keeping both representations in step
    pub fn shift(&mut self, seconds: i64) -> Result<()> {
        let out_of_range = || Error::TimestampOutOfRange {
            timestamp: self.timestamp,
            offset: seconds,
        };
        let timestamp = self.timestamp.checked_add(seconds).ok_or_else(out_of_range)?;
        let capture_time = local_time(timestamp).ok_or_else(out_of_range)?;

        self.timestamp = timestamp;
        self.capture_time = capture_time;
        Ok(())
    }
}

/// Case-fold a camera model into its grouping key
pub fn camera_key(camera_model: &str) -> String {
    camera_model.to_lowercase()
}

/// Parse "YYYY:MM:DD HH:MM:SS" as local time into seconds since the epoch
pub fn parse_capture_time(s: &str) -> Option<i64> {
    let naive = NaiveDateTime::parse_from_str(s.trim(), CAPTURE_TIME_FORMAT).ok()?;
    // Ambiguous wall-clock times (DST fold) resolve to the earlier instant
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.timestamp())
}

fn local_time(timestamp: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp(timestamp, 0).map(|utc| utc.with_timezone(&Local).naive_local())
}
