//! Partition scanning and weight generation.
//!
//! The first half of the generate pass. Walks the photo root, treating each
//! immediate subdirectory as a *partition*, and counts the matching items in
//! each partition's full subtree. The resulting [`WeightTable`] is what the
//! cache stores and the selector samples from.
//!
//! ## Directory Structure
//!
//! ```text
//! photos/                          # Photo root
//! ├── 2022/                        # Partition "2022"
//! │   ├── IMG_0001.jpg
//! │   └── summer/                  # Nested folders are counted too
//! │       └── beach.JPEG
//! ├── 2023/                        # Partition "2023"
//! │   └── IMG_1200.jpg
//! ├── 2024/                        # No matching items → not in the table
//! │   └── notes.txt
//! └── stray.jpg                    # Files at the root are ignored
//! ```
//!
//! ## Extension Matching
//!
//! Matching is deliberately loose. A file matches when its extension
//! (lowercased, with the leading dot) contains a recognised extension, or is
//! contained in one. With the stock set `[".jpg", ".jpeg"]`, `photo.JPEG`
//! and `photo.jpg` match, `photo.txt` does not. See [`ExtensionMatcher`].

use crate::weights::{PartitionWeight, WeightTable};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Case-insensitive, substring-based extension test.
///
/// Extensions are compared with their leading dot, so both `".jpg"` and
/// `"jpg"` in the recognised set behave the same. Files without an extension
/// never match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionMatcher {
    extensions: Vec<String>,
}

impl ExtensionMatcher {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .map(|e| dotted(&e.as_ref().to_lowercase()))
            .filter(|e| e.len() > 1)
            .collect();
        Self { extensions }
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Whether a file name carries a recognised extension.
    pub fn matches(&self, path: &Path) -> bool {
        let Some(ext) = path.extension() else {
            return false;
        };
        let ext = dotted(&ext.to_string_lossy().to_lowercase());
        if ext.len() < 2 {
            return false;
        }
        self.extensions
            .iter()
            .any(|known| ext.contains(known.as_str()) || known.contains(ext.as_str()))
    }
}

fn dotted(ext: &str) -> String {
    if ext.starts_with('.') {
        ext.to_string()
    } else {
        format!(".{ext}")
    }
}

/// Scans a photo root into a weight table.
#[derive(Debug, Clone)]
pub struct Scanner {
    matcher: ExtensionMatcher,
}

impl Scanner {
    pub fn new(matcher: ExtensionMatcher) -> Self {
        Self { matcher }
    }

    /// Count matching items under every immediate subdirectory of `root`.
    ///
    /// Partitions with no matching items are left out. The table comes back
    /// sorted by partition name. Only an unreadable root is an error;
    /// unreadable entries inside a partition are skipped.
    pub fn scan(&self, root: &Path) -> Result<WeightTable, ScanError> {
        let mut records = Vec::new();
        let mut total = 0u64;

        for (name, dir) in list_partitions(root)? {
            let count = count_items(&dir, &self.matcher);
            info!(partition = %name, count, "Dir: {name} Count: {count}");
            if count > 0 {
                total += count;
                records.push(PartitionWeight { name, count });
            }
        }

        let table = WeightTable::from_scan(records);
        info!(
            partitions = table.len(),
            items = total,
            "generated weights for {total} files"
        );
        Ok(table)
    }
}

/// Immediate subdirectories of `root` as `(name, path)` pairs, sorted by name.
fn list_partitions(root: &Path) -> Result<Vec<(String, PathBuf)>, ScanError> {
    let io_err = |source| ScanError::Io {
        path: root.to_path_buf(),
        source,
    };
    let mut partitions = Vec::new();
    for entry in fs::read_dir(root).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        // A lossy name would not resolve back to this directory at pick time
        match entry.file_name().into_string() {
            Ok(name) => partitions.push((name, path)),
            Err(raw) => warn!(dir = %path.display(), "skipping partition with non-UTF-8 name {raw:?}"),
        }
    }
    partitions.sort();
    Ok(partitions)
}

fn count_items(dir: &Path, matcher: &ExtensionMatcher) -> u64 {
    matching_items(dir, matcher).count() as u64
}

/// Every matching file under `dir`, recursively. Siblings are visited in
/// file name order so repeated walks of an unchanged tree agree.
///
/// Walk errors (permission denied, entries vanishing mid-walk) are logged
/// and skipped.
pub fn matching_items<'a>(
    dir: &Path,
    matcher: &'a ExtensionMatcher,
) -> impl Iterator<Item = PathBuf> + 'a {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("skipping unreadable entry: {e}");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(move |path| matcher.matches(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{touch, year_tree};
    use tempfile::TempDir;

    fn stock_matcher() -> ExtensionMatcher {
        ExtensionMatcher::new([".jpg", ".jpeg"])
    }

    #[test]
    fn matcher_is_case_insensitive() {
        let m = stock_matcher();
        assert!(m.matches(Path::new("photo.JPEG")));
        assert!(m.matches(Path::new("photo.Jpg")));
        assert!(!m.matches(Path::new("photo.txt")));
    }

    #[test]
    fn matcher_is_substring_based() {
        let m = ExtensionMatcher::new([".jpg"]);
        // Loose by design: a longer extension containing ".jpg" matches
        assert!(m.matches(Path::new("odd.jpgx")));
        assert!(!m.matches(Path::new("photo.jpeg")));
    }

    #[test]
    fn matcher_accepts_extensions_without_dot() {
        let m = ExtensionMatcher::new(["JPG"]);
        assert_eq!(m.extensions(), &[".jpg".to_string()]);
        assert!(m.matches(Path::new("a/b/c.jpg")));
    }

    #[test]
    fn matcher_rejects_files_without_extension() {
        let m = stock_matcher();
        assert!(!m.matches(Path::new("README")));
        assert!(!m.matches(Path::new(".jpg")));
        assert!(!m.matches(Path::new("trailing.")));
    }

    #[test]
    fn scan_counts_per_partition_sorted() {
        let tmp = year_tree(&[("2023", &["a.jpg"]), ("2022", &["a.jpg", "b.jpeg", "c.JPG"])]);
        let table = Scanner::new(stock_matcher()).scan(tmp.path()).unwrap();

        let records: Vec<(&str, u64)> = table.iter().map(|r| (r.name.as_str(), r.count)).collect();
        assert_eq!(records, vec![("2022", 3), ("2023", 1)]);
    }

    #[test]
    fn scan_recurses_into_nested_folders() {
        let tmp = year_tree(&[("2021", &["top.jpg", "summer/beach.jpg", "summer/deep/x.jpeg"])]);
        let table = Scanner::new(stock_matcher()).scan(tmp.path()).unwrap();
        assert_eq!(table.get("2021").map(|r| r.count), Some(3));
    }

    #[test]
    fn scan_excludes_empty_partitions() {
        let tmp = year_tree(&[("2020", &["notes.txt"]), ("2021", &["a.jpg"])]);
        fs::create_dir(tmp.path().join("2019")).unwrap();

        let table = Scanner::new(stock_matcher()).scan(tmp.path()).unwrap();
        assert!(table.get("2020").is_none());
        assert!(table.get("2019").is_none());
        assert!(table.iter().all(|r| r.count > 0));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn scan_ignores_files_at_root() {
        let tmp = year_tree(&[("2021", &["a.jpg"])]);
        touch(&tmp.path().join("stray.jpg"));

        let table = Scanner::new(stock_matcher()).scan(tmp.path()).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("2021").map(|r| r.count), Some(1));
    }

    #[test]
    fn scan_empty_root_gives_empty_table() {
        let tmp = TempDir::new().unwrap();
        let table = Scanner::new(stock_matcher()).scan(tmp.path()).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn scan_missing_root_is_error() {
        let tmp = TempDir::new().unwrap();
        let result = Scanner::new(stock_matcher()).scan(&tmp.path().join("missing"));
        assert!(matches!(result, Err(ScanError::Io { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn scan_skips_non_utf8_partitions() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let tmp = year_tree(&[("2021", &["a.jpg"])]);
        let odd = tmp.path().join(OsStr::from_bytes(b"20\xff22"));
        if fs::create_dir(&odd).is_err() {
            // Some filesystems refuse non-UTF-8 names outright
            return;
        }
        touch(&odd.join("b.jpg"));

        let table = Scanner::new(stock_matcher()).scan(tmp.path()).unwrap();
        let names: Vec<&str> = table.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["2021"]);
    }

    #[test]
    fn matching_items_lists_full_paths() {
        let tmp = year_tree(&[("2022", &["a.jpg", "sub/b.jpg", "c.png"])]);
        let matcher = stock_matcher();
        let items: Vec<PathBuf> = matching_items(&tmp.path().join("2022"), &matcher).collect();
        assert_eq!(
            items,
            vec![
                tmp.path().join("2022/a.jpg"),
                tmp.path().join("2022/sub/b.jpg"),
            ]
        );
    }
}
