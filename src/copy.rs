//! Copying records into the output folder under their chronological rank

use crate::error::{Error, Result};
use crate::record::ImageRecord;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const COPY_BUFFER_SIZE: usize = 256 * 1024;

/// One planned copy: source file and its ranked destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyPlan {
    /// 1-based position in chronological order
    pub rank: usize,
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Map the i-th record (1-based) to `output_dir/{i}.{extension}`
pub fn plan_copies(
    records: &[ImageRecord],
    input_dir: &Path,
    output_dir: &Path,
    extension: &str,
) -> Vec<CopyPlan> {
    records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let rank = i + 1;
            CopyPlan {
                rank,
                source: input_dir.join(record.filename()),
                destination: output_dir.join(format!("{}.{}", rank, extension)),
            }
        })
        .collect()
}

/// Copy every record to its ranked name, overwriting existing files.
///
/// Input files are never overwritten: a destination that already is its
/// own source is left as is, and one that is any other source aborts the
/// run before anything is copied. Otherwise stops at the first failure;
/// files already copied stay in place.
pub fn copy_renamed(
    records: &[ImageRecord],
    input_dir: &Path,
    output_dir: &Path,
    extension: &str,
) -> Result<Vec<CopyPlan>> {
    if !output_dir.is_dir() {
        return Err(Error::OutputDirectoryMissing(output_dir.to_path_buf()));
    }

    let plan = plan_copies(records, input_dir, output_dir, extension);
    let in_place = check_destinations(&plan)?;

    for (item, in_place) in plan.iter().zip(in_place) {
        if in_place {
            debug!(source = ?item.source, "Already in place, not copied");
            continue;
        }
        copy_file(&item.source, &item.destination).map_err(|error| Error::Copy {
            from: item.source.clone(),
            to: item.destination.clone(),
            error,
        })?;
        debug!(source = ?item.source, destination = ?item.destination, "Copied");
    }

    info!(count = plan.len(), output = ?output_dir, "Copied files");
    Ok(plan)
}

/// For each planned copy, whether its destination is its own source.
///
/// Fails if a destination is the same file as another planned source.
fn check_destinations(plan: &[CopyPlan]) -> Result<Vec<bool>> {
    let sources: HashMap<FileId, usize> = plan
        .iter()
        .enumerate()
        .filter_map(|(i, item)| file_id(&item.source).map(|id| (id, i)))
        .collect();

    plan.iter()
        .enumerate()
        .map(|(i, item)| {
            match file_id(&item.destination).and_then(|id| sources.get(&id)) {
                None => Ok(false),
                Some(&j) if j == i => Ok(true),
                Some(&j) => Err(Error::DestinationIsInput {
                    destination: item.destination.clone(),
                    source_file: plan[j].source.clone(),
                }),
            }
        })
        .collect()
}

#[cfg(unix)]
type FileId = (u64, u64);

#[cfg(not(unix))]
type FileId = PathBuf;

/// Identity of an existing file, equal for every path reaching it
#[cfg(unix)]
fn file_id(path: &Path) -> Option<FileId> {
    use std::os::unix::fs::MetadataExt;
    fs::metadata(path).ok().map(|m| (m.dev(), m.ino()))
}

#[cfg(not(unix))]
fn file_id(path: &Path) -> Option<FileId> {
    fs::canonicalize(path).ok()
}

/// Copy with buffered I/O, keeping the source modification time
fn copy_file(source: &Path, dest: &Path) -> std::io::Result<()> {
    let src_file = File::open(source)?;
    let dest_file = File::create(dest)?;

    let mut reader = BufReader::with_capacity(COPY_BUFFER_SIZE, src_file);
    let mut writer = BufWriter::with_capacity(COPY_BUFFER_SIZE, dest_file);

    let mut buffer = vec![0u8; COPY_BUFFER_SIZE];
    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        writer.write_all(&buffer[..bytes_read])?;
    }
    writer.flush()?;
    drop(writer);

    if let Ok(metadata) = fs::metadata(source)
        && let Ok(mtime) = metadata.modified()
        && let Err(e) = filetime::set_file_mtime(dest, filetime::FileTime::from_system_time(mtime))
    {
        debug!(?dest, error = %e, "Could not preserve modification time");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record(name: &str, sequence: usize, timestamp: i64) -> ImageRecord {
        ImageRecord::from_timestamp(name, sequence, timestamp, "X").unwrap()
    }

    #[test]
    fn test_plan_copies_is_one_based() {
        let records = vec![record("b.jpg", 1, 10), record("a.jpg", 0, 20)];
        let plan = plan_copies(&records, Path::new("in"), Path::new("out"), "jpg");

        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].rank, 1);
        assert_eq!(plan[0].source, Path::new("in").join("b.jpg"));
        assert_eq!(plan[0].destination, Path::new("out").join("1.jpg"));
        assert_eq!(plan[1].source, Path::new("in").join("a.jpg"));
        assert_eq!(plan[1].destination, Path::new("out").join("2.jpg"));
    }

    #[test]
    fn test_copy_renamed_copies_and_overwrites() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        fs::write(input.path().join("late.jpg"), b"late").unwrap();
        fs::write(input.path().join("early.jpg"), b"early").unwrap();
        fs::write(output.path().join("1.jpg"), b"stale").unwrap();

        let records = vec![record("early.jpg", 0, 1), record("late.jpg", 1, 2)];
        let plan = copy_renamed(&records, input.path(), output.path(), "jpg").unwrap();

        assert_eq!(plan.len(), 2);
        assert_eq!(fs::read(output.path().join("1.jpg")).unwrap(), b"early");
        assert_eq!(fs::read(output.path().join("2.jpg")).unwrap(), b"late");
        // Sources are untouched
        assert_eq!(fs::read(input.path().join("early.jpg")).unwrap(), b"early");
    }

    #[test]
    fn test_copy_preserves_mtime() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        let source = input.path().join("a.jpg");
        fs::write(&source, b"data").unwrap();
        let mtime = filetime::FileTime::from_unix_time(1_600_000_000, 0);
        filetime::set_file_mtime(&source, mtime).unwrap();

        copy_renamed(&[record("a.jpg", 0, 1)], input.path(), output.path(), "png").unwrap();

        let meta = fs::metadata(output.path().join("1.png")).unwrap();
        assert_eq!(filetime::FileTime::from_last_modification_time(&meta), mtime);
    }

    #[test]
    fn test_copy_renamed_missing_output_dir() {
        let input = tempdir().unwrap();
        fs::write(input.path().join("a.jpg"), b"a").unwrap();
        let missing = input.path().join("nope");

        let err = copy_renamed(&[record("a.jpg", 0, 1)], input.path(), &missing, "jpg").unwrap_err();
        assert!(matches!(err, Error::OutputDirectoryMissing(p) if p == missing));
    }

    #[test]
    fn test_copy_in_place_leaves_source_intact() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("1.jpg"), b"first").unwrap();

        let plan = copy_renamed(&[record("1.jpg", 0, 1)], dir.path(), dir.path(), "jpg").unwrap();

        assert_eq!(plan.len(), 1);
        assert_eq!(fs::read(dir.path().join("1.jpg")).unwrap(), b"first");
    }

    #[test]
    fn test_copy_refuses_to_overwrite_other_input() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.jpg"), b"earliest").unwrap();
        fs::write(dir.path().join("1.jpg"), b"second").unwrap();

        // a.jpg ranks first, so its destination 1.jpg is still an input
        let records = vec![record("a.jpg", 0, 1), record("1.jpg", 1, 2)];
        let err = copy_renamed(&records, dir.path(), dir.path(), "jpg").unwrap_err();

        match err {
            Error::DestinationIsInput {
                destination,
                source_file,
            } => {
                assert_eq!(destination, dir.path().join("1.jpg"));
                assert_eq!(source_file, dir.path().join("1.jpg"));
            }
            other => panic!("unexpected error: {other}"),
        }
        // Nothing was written
        assert_eq!(fs::read(dir.path().join("1.jpg")).unwrap(), b"second");
        assert_eq!(fs::read(dir.path().join("a.jpg")).unwrap(), b"earliest");
        assert!(!dir.path().join("2.jpg").exists());
    }

    #[test]
    fn test_copy_renamed_vanished_source() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        fs::write(input.path().join("a.jpg"), b"a").unwrap();

        let records = vec![record("a.jpg", 0, 1), record("gone.jpg", 1, 2)];
        let err = copy_renamed(&records, input.path(), output.path(), "jpg").unwrap_err();

        match err {
            Error::Copy { from, to, .. } => {
                assert_eq!(from, input.path().join("gone.jpg"));
                assert_eq!(to, output.path().join("2.jpg"));
            }
            other => panic!("unexpected error: {other}"),
        }
        // Partial output is kept
        assert!(output.path().join("1.jpg").exists());
    }
}
