// JSONL snapshot files: one record per line, in row order

use crate::record::Record;
use eyre::{Context, Result};
use fs2::FileExt;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Sidecar lock file guarding a snapshot: `<path>.lock`
pub fn lock_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".lock");
    PathBuf::from(name)
}

/// Take the exclusive lock on a snapshot's sidecar file, blocking until free
///
/// The lock is held until the returned file is dropped. Hold it across a
/// whole load, mutate, save sequence; `write_jsonl` does not lock by itself.
pub fn lock_snapshot(path: &Path) -> Result<File> {
    create_parent_dir(path)?;

    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(lock_path(path))
        .context("Failed to open snapshot lock file")?;

    // Acquire exclusive lock before touching the snapshot
    file.lock_exclusive().context("Failed to acquire snapshot lock")?;
    debug!(file = ?path, "Snapshot lock acquired");
    Ok(file)
}

/// Write records to a JSONL file, replacing its contents
///
/// Writes a sibling temp file, then renames it over `path`, so readers never
/// see a half-written snapshot. Callers serialize writers with
/// `lock_snapshot`.
pub fn write_jsonl<T: Record>(path: &Path, records: &[T]) -> Result<()> {
    create_parent_dir(path)?;

    let tmp_path = path.with_extension("jsonl.tmp");
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&tmp_path)
        .context("Failed to open temp snapshot file")?;

    let mut writer = BufWriter::new(&file);
    for record in records {
        let json = serde_json::to_string(record).context("Failed to serialize record")?;
        writeln!(writer, "{}", json)?;
    }
    writer.flush()?;
    drop(writer);
    file.sync_all()?;

    fs::rename(&tmp_path, path).context("Failed to move snapshot into place")?;

    debug!(file = ?path, count = records.len(), "Wrote JSONL snapshot");
    Ok(())
}

fn create_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context("Failed to create snapshot directory")?;
    }
    Ok(())
}

/// Read records from a JSONL file, keeping file order
///
/// Blank lines are ignored and malformed lines are logged and skipped. When an
/// id appears twice, the later line replaces the earlier record in place.
pub fn read_jsonl<T: Record>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        // File doesn't exist yet, nothing to load
        return Ok(Vec::new());
    }

    let file = File::open(path).context("Failed to open JSONL file")?;
    let reader = BufReader::new(file);
    let mut records: Vec<T> = Vec::new();
    let mut rows: HashMap<String, usize> = HashMap::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                warn!(
                    file = ?path,
                    line = line_num + 1,
                    error = ?e,
                    "Failed to read line, skipping"
                );
                continue;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        let record: T = match serde_json::from_str(&line) {
            Ok(r) => r,
            Err(e) => {
                warn!(
                    file = ?path,
                    line = line_num + 1,
                    error = ?e,
                    "Failed to parse JSON, skipping"
                );
                continue;
            }
        };

        let existing = rows.get(record.id()).copied();
        match existing {
            Some(row) => records[row] = record,
            None => {
                rows.insert(record.id().to_string(), records.len());
                records.push(record);
            }
        }
    }

    info!(file = ?path, count = records.len(), "Loaded records from JSONL");

    Ok(records)
}
