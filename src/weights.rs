//! Weight table and its on-disk cache.
//!
//! A [`WeightTable`] maps each partition (a year folder) to the number of
//! matching items found under it. Scanning a large archive is the expensive
//! part of a run, so the table is persisted to a small CSV side file and
//! reused until the [staleness policy](crate::staleness) says otherwise.
//!
//! ## File format
//!
//! ```text
//! Dir,Count
//! 2021,812
//! 2022,1433
//! 2023,97
//! ```
//!
//! One header row, then one row per partition sorted by `Dir`. Other tooling
//! may read this file, so the column names and row order are fixed.
//!
//! ## Writes
//!
//! The cache is only ever rewritten whole. [`write`] serialises into a
//! temporary file in the cache's own directory and persists it over the
//! final path, so a concurrent reader sees either the old file or the new
//! one. Two runs racing to regenerate is harmless: last writer wins. The
//! new file keeps the old one's permissions (`0644` the first time) so other
//! tooling can read it.
//!
//! ## Reads
//!
//! [`read`] is strict. A malformed row is a [`StoreError::Parse`], never a
//! default weight; the caller regenerates instead.

use crate::publish::inherit_permissions;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error on weight cache {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Malformed weight cache {path} (line {line}): {reason}")]
    Parse {
        path: PathBuf,
        line: u64,
        reason: String,
    },
    #[error("Duplicate partition '{0}' in weight table")]
    DuplicatePartition(String),
}

/// One partition and its item count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionWeight {
    pub name: String,
    pub count: u64,
}

/// Partition weights keyed by unique name, kept sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeightTable {
    records: Vec<PartitionWeight>,
}

impl WeightTable {
    /// Build a table from records, rejecting duplicate names.
    pub fn from_records(records: Vec<PartitionWeight>) -> Result<Self, StoreError> {
        let mut seen = HashSet::new();
        for record in &records {
            if !seen.insert(record.name.as_str()) {
                return Err(StoreError::DuplicatePartition(record.name.clone()));
            }
        }
        Ok(Self::sorted(records))
    }

    /// Directory names are unique by construction, no need to re-check.
    pub(crate) fn from_scan(records: Vec<PartitionWeight>) -> Self {
        Self::sorted(records)
    }

    fn sorted(mut records: Vec<PartitionWeight>) -> Self {
        records.sort_by(|a, b| a.name.cmp(&b.name));
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PartitionWeight> {
        self.records.iter()
    }

    pub fn records(&self) -> &[PartitionWeight] {
        &self.records
    }

    pub fn get(&self, name: &str) -> Option<&PartitionWeight> {
        self.records
            .binary_search_by(|r| r.name.as_str().cmp(name))
            .ok()
            .map(|i| &self.records[i])
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.records.iter().map(|r| r.count).sum()
    }
}

/// Row shape of the CSV file. Counts are read as text so that `"12"` and
/// `"12.0"` are both accepted.
#[derive(Debug, Serialize, Deserialize)]
struct Row {
    #[serde(rename = "Dir")]
    dir: String,
    #[serde(rename = "Count")]
    count: String,
}

/// Persist the table to `path`, replacing any existing file.
pub fn write(table: &WeightTable, path: &Path) -> Result<(), StoreError> {
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
    {
        let mut writer = csv::Writer::from_writer(tmp.as_file_mut());
        for record in table.iter() {
            writer
                .serialize(Row {
                    dir: record.name.clone(),
                    count: record.count.to_string(),
                })
                .map_err(|e| io_err(io::Error::other(e)))?;
        }
        // An empty table still gets its header
        if table.is_empty() {
            writer
                .write_record(["Dir", "Count"])
                .map_err(|e| io_err(io::Error::other(e)))?;
        }
        writer.flush().map_err(io_err)?;
    }
    tmp.as_file_mut().sync_all().map_err(io_err)?;
    inherit_permissions(tmp.as_file(), path).map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}

/// Load a table previously written by [`write`].
pub fn read(path: &Path) -> Result<WeightTable, StoreError> {
    let content = std::fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&content, path)
}

fn parse(content: &str, path: &Path) -> Result<WeightTable, StoreError> {
    let parse_err = |line: u64, reason: String| StoreError::Parse {
        path: path.to_path_buf(),
        line,
        reason,
    };

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());
    let headers = reader
        .headers()
        .map_err(|e| parse_err(1, e.to_string()))?
        .clone();
    if headers.iter().collect::<Vec<_>>() != ["Dir", "Count"] {
        return Err(parse_err(
            1,
            format!("expected header 'Dir,Count', found '{}'", headers.as_slice()),
        ));
    }

    let mut records = Vec::new();
    for result in reader.deserialize::<Row>() {
        let row = result.map_err(|e| {
            let line = e.position().map(|p| p.line()).unwrap_or(0);
            parse_err(line, e.to_string())
        })?;
        let line = records.len() as u64 + 2;
        let name = row.dir;
        if name.is_empty() {
            return Err(parse_err(line, "empty Dir".into()));
        }
        let count = parse_count(&row.count).map_err(|reason| parse_err(line, reason))?;
        records.push(PartitionWeight { name, count });
    }

    WeightTable::from_records(records)
}

/// Integer or decimal text, coerced to a non-negative whole count.
fn parse_count(text: &str) -> Result<u64, String> {
    let text = text.trim();
    if let Ok(n) = text.parse::<u64>() {
        return Ok(n);
    }
    let value: f64 = text
        .parse()
        .map_err(|_| format!("Count '{text}' is not a number"))?;
    if !value.is_finite() || value < 0.0 {
        return Err(format!("Count '{text}' must be a non-negative number"));
    }
    Ok(value.trunc() as u64)
}

/// Whether a cache file is present at `path`.
pub fn exists(path: &Path) -> bool {
    path.is_file()
}

/// Last-modified time of the cache file.
pub fn modified(path: &Path) -> io::Result<SystemTime> {
    std::fs::metadata(path)?.modified()
}

/// Time elapsed since the cache was last written. A modification time in
/// the future reads as zero age.
pub fn age(path: &Path) -> io::Result<Duration> {
    let modified = modified(path)?;
    Ok(SystemTime::now()
        .duration_since(modified)
        .unwrap_or(Duration::ZERO))
}
