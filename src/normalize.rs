//! Clock drift correction between cameras
//!
//! Each camera's clock may be off by a constant amount. Shifting every
//! record of a camera by a per-camera offset aligns the timelines before
//! they are merged.

use crate::error::{Error, Result};
use crate::partition::Partitions;
use crate::record::ImageRecord;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Add `offset` seconds to every record, preserving order.
///
/// All-or-nothing: if any record would overflow, nothing is changed.
pub fn shift(records: &mut [ImageRecord], offset: i64) -> Result<()> {
    if offset == 0 {
        return Ok(());
    }

    let mut shifted = records.to_vec();
    for record in &mut shifted {
        record.shift(offset)?;
    }
    records.clone_from_slice(&shifted);
    Ok(())
}

/// Apply configured per-camera offsets.
///
/// Returns the configured camera keys that have no records in this run;
/// each of them is logged as a warning and otherwise ignored. Cameras
/// without a configured offset are left untouched.
pub fn normalize_from_config(
    partitions: &mut Partitions,
    offsets: &BTreeMap<String, i64>,
) -> Result<Vec<String>> {
    let mut unknown = Vec::new();

    for (camera_key, &offset) in offsets {
        match partitions.get_mut(camera_key) {
            Some(records) => {
                info!(camera = %camera_key, offset, count = records.len(), "Shifting camera clock");
                shift(records, offset)?;
            }
            None => {
                warn!(camera = %camera_key, "No pictures taken with configured camera");
                unknown.push(camera_key.clone());
            }
        }
    }

    Ok(unknown)
}

/// Shift `records` so that `records[index]` lands on `reference + offset`.
///
/// Returns the difference that was applied.
pub fn normalize_to_reference(
    records: &mut [ImageRecord],
    reference: i64,
    index: usize,
    offset: i64,
) -> Result<i64> {
    let anchor = records
        .get(index)
        .ok_or(Error::ReferenceIndexOutOfRange {
            index,
            len: records.len(),
        })?
        .timestamp();

    let diff = reference
        .checked_sub(anchor)
        .and_then(|d| d.checked_add(offset))
        .ok_or(Error::TimestampOutOfRange {
            timestamp: anchor,
            offset,
        })?;

    debug!(reference, index, offset, diff, "Aligning records to reference");
    shift(records, diff)?;
    Ok(diff)
}
