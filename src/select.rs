//! Two-stage weighted selection.
//!
//! Picking is split in two on purpose:
//!
//! 1. **Partition**: one weighted draw over the cached [`WeightTable`], so a
//!    year with 3,000 photos is thirty times likelier than a year with 100.
//! 2. **Item**: a fresh recursive walk of the chosen partition, then one
//!    uniform draw over the matching files found.
//!
//! Only the per-partition counts are cached. Item lists can be huge and
//! drift between rebuilds, so they are enumerated lazily, for one partition
//! only, at pick time.
//!
//! If the walk finds nothing (the partition was emptied after the cache was
//! written) the [`Selection`] comes back without an item. That is a signal
//! for the caller to skip this run, not an error.

use crate::scan::{ExtensionMatcher, matching_items};
use crate::weights::{PartitionWeight, WeightTable};
use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use rand::seq::IndexedRandom;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum SelectError {
    #[error("Weight table is empty, nothing to select from")]
    EmptyTable,
    #[error("Weight table has unusable weights: {0}")]
    InvalidWeights(String),
    #[error("Cannot resolve photo root {path}: {source}")]
    Root {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The item chosen inside a partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedItem {
    /// Absolute, normalised path on disk.
    pub path: PathBuf,
    /// `path` as text with single quotes escaped (`'` → `\'`), safe to hand
    /// to shell-quoting consumers.
    pub item_path: String,
}

impl SelectedItem {
    fn new(path: PathBuf) -> Self {
        let item_path = escape_quotes(&path.to_string_lossy());
        Self { path, item_path }
    }

    /// Base file name, unescaped.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

/// Result of one pick. `item` is `None` when the chosen partition turned out
/// to hold no matching files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub partition: String,
    pub item: Option<SelectedItem>,
}

impl Selection {
    /// Escaped item path, or `""` when nothing was found.
    pub fn item_path(&self) -> &str {
        self.item.as_ref().map_or("", |i| i.item_path.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.item.is_none()
    }

    /// Label drawn onto the prepared image: partition plus file name.
    pub fn annotation(&self) -> String {
        match &self.item {
            Some(item) => format!("{} {}", self.partition, item.file_name()),
            None => self.partition.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Selector {
    matcher: ExtensionMatcher,
}

impl Selector {
    pub fn new(matcher: ExtensionMatcher) -> Self {
        Self { matcher }
    }

    /// Pick one item from `root` using the thread-local RNG.
    pub fn select(&self, root: &Path, table: &WeightTable) -> Result<Selection, SelectError> {
        self.select_with(root, table, &mut rand::rng())
    }

    /// Pick one item from `root` using `rng`.
    pub fn select_with<R: Rng + ?Sized>(
        &self,
        root: &Path,
        table: &WeightTable,
        rng: &mut R,
    ) -> Result<Selection, SelectError> {
        let partition = choose_partition(table, rng)?;
        debug!(partition = %partition.name, "chose partition");

        let root = std::path::absolute(root).map_err(|source| SelectError::Root {
            path: root.to_path_buf(),
            source,
        })?;
        let dir = normalize(&root.join(&partition.name));
        let items: Vec<PathBuf> = matching_items(&dir, &self.matcher).collect();

        let item = items.choose(rng).map(|p| SelectedItem::new(normalize(p)));
        match &item {
            Some(item) => info!(
                partition = %partition.name,
                image = %item.item_path,
                candidates = items.len(),
                "selected image"
            ),
            None => warn!(
                partition = %partition.name,
                dir = %dir.display(),
                "read failure: no matching items left in partition"
            ),
        }

        Ok(Selection {
            partition: partition.name.clone(),
            item,
        })
    }
}

/// Draw one partition with probability proportional to its count.
///
/// Equal weights are broken uniformly by the sampler itself.
pub fn choose_partition<'t, R: Rng + ?Sized>(
    table: &'t WeightTable,
    rng: &mut R,
) -> Result<&'t PartitionWeight, SelectError> {
    if table.is_empty() {
        return Err(SelectError::EmptyTable);
    }
    let weights = table.iter().map(|r| r.count as f64);
    let dist = WeightedIndex::new(weights).map_err(|e| SelectError::InvalidWeights(e.to_string()))?;
    Ok(&table.records()[dist.sample(rng)])
}

fn escape_quotes(path: &str) -> String {
    path.replace('\'', "\\'")
}

/// Lexically resolve `.` and `..` without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
