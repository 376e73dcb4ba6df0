//! Grouping of image records by camera

use crate::record::ImageRecord;
use crate::sort::sort_by_time;
use std::collections::BTreeMap;

/// Image records grouped by case-folded camera model
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partitions {
    groups: BTreeMap<String, Vec<ImageRecord>>,
}

/// Group records by camera key, optionally sorting each group by time
pub fn partition(records: Vec<ImageRecord>, sort: bool) -> Partitions {
    let mut groups: BTreeMap<String, Vec<ImageRecord>> = BTreeMap::new();
    for record in records {
        groups
            .entry(record.camera_key().to_string())
            .or_default()
            .push(record);
    }

    if sort {
        for group in groups.values_mut() {
            sort_by_time(group);
        }
    }

    Partitions { groups }
}

impl Partitions {
    /// Camera keys present, in lexical order
    pub fn camera_keys(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn get(&self, camera_key: &str) -> Option<&[ImageRecord]> {
        self.groups.get(camera_key).map(Vec::as_slice)
    }

    pub fn get_mut(&mut self, camera_key: &str) -> Option<&mut [ImageRecord]> {
        self.groups.get_mut(camera_key).map(Vec::as_mut_slice)
    }

    pub fn contains(&self, camera_key: &str) -> bool {
        self.groups.contains_key(camera_key)
    }

    /// Number of cameras
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of records across all cameras
    pub fn record_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ImageRecord])> {
        self.groups.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Flatten back into a single list in original scan order
    pub fn into_records(self) -> Vec<ImageRecord> {
        let mut records: Vec<ImageRecord> = self.groups.into_values().flatten().collect();
        records.sort_by_key(ImageRecord::sequence);
        records
    }
}
