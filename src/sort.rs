//! Chronological ordering of image records

use crate::record::ImageRecord;

/// Stable sort by ascending timestamp.
///
/// Records sharing a timestamp keep their relative order, so repeated runs
/// over the same input produce the same sequence.
pub fn sort_by_time(records: &mut [ImageRecord]) {
    records.sort_by_key(ImageRecord::timestamp);
}
