//! Orchestration of the two operations.
//!
//! ```text
//! generate:  root ──scan──▶ WeightTable ──write──▶ weights.csv
//!
//! pick:      weights.csv stale? ──yes──▶ generate
//!                 │
//!                 ▼
//!            WeightTable ──select──▶ Selection ──prepare──▶ temp file ──commit──▶ destination
//! ```
//!
//! Errors surface once, where they happen. Nothing here retries: the picker
//! runs from a scheduler, and the next run starts over, regenerating the
//! cache if it has gone stale.

use crate::config::PickerConfig;
use crate::imaging::{self, BackendError, Dimensions, ImageBackend, PrepareConfig, RustBackend};
use crate::publish::{self, PublishError, PublishMode};
use crate::scan::{ScanError, Scanner};
use crate::select::{SelectError, Selection, Selector};
use crate::staleness::StalenessPolicy;
use crate::weights::{self, StoreError, WeightTable};
use chrono::{DateTime, Local};
use rand::Rng;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Error, Debug)]
pub enum PickError {
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Select(#[from] SelectError),
    #[error("Cannot check weight cache {path}: {source}")]
    Staleness {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("No matching image found in partition '{partition}'")]
    EmptySelection { partition: String },
    #[error("Image preparation failed: {0}")]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Publish(#[from] PublishError),
}

/// Outcome of a successful pick-and-publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub selection: Selection,
    /// Size of the prepared image.
    pub dimensions: Dimensions,
    /// `None` on a dry run.
    pub destination: Option<PathBuf>,
}

/// Runs generate and pick against one photo root and one cache file.
#[derive(Debug, Clone)]
pub struct Picker {
    root: PathBuf,
    cache_path: PathBuf,
    scanner: Scanner,
    selector: Selector,
    staleness: StalenessPolicy,
    prepare: PrepareConfig,
}

impl Picker {
    pub fn new(config: &PickerConfig, root: &Path, cache_path: &Path) -> Self {
        let matcher = config.matcher();
        Self {
            root: root.to_path_buf(),
            cache_path: cache_path.to_path_buf(),
            scanner: Scanner::new(matcher.clone()),
            selector: Selector::new(matcher),
            staleness: config.staleness(),
            prepare: PrepareConfig::from(config),
        }
    }

    /// Rescan the root and rewrite the cache.
    pub fn generate(&self) -> Result<WeightTable, PickError> {
        let table = self.scanner.scan(&self.root)?;
        weights::write(&table, &self.cache_path)?;
        info!(
            cache = %self.cache_path.display(),
            partitions = table.len(),
            "wrote weight cache"
        );
        Ok(table)
    }

    /// The current weight table, regenerating the cache first if it is
    /// missing or expired.
    pub fn load_weights(&self) -> Result<WeightTable, PickError> {
        let stale_err = |source| PickError::Staleness {
            path: self.cache_path.clone(),
            source,
        };
        if let Some(expiry) = self.staleness.expires_at(&self.cache_path).map_err(stale_err)? {
            let expiry: DateTime<Local> = expiry.into();
            info!(
                "weight cache expires {}",
                expiry.format("%Y-%m-%d %H:%M:%S")
            );
        }

        if self.staleness.is_stale(&self.cache_path).map_err(stale_err)? {
            debug!(cache = %self.cache_path.display(), "weight cache stale, regenerating");
            return self.generate();
        }
        Ok(weights::read(&self.cache_path)?)
    }

    /// Load weights and select one photo.
    pub fn pick(&self) -> Result<Selection, PickError> {
        self.pick_with(&mut rand::rng())
    }

    pub fn pick_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Selection, PickError> {
        let table = self.load_weights()?;
        Ok(self.selector.select_with(&self.root, &table, rng)?)
    }

    /// Prepare the selected photo and swap it into `destination`.
    ///
    /// An empty selection is reported and fails the run without touching
    /// the destination.
    pub fn publish(
        &self,
        selection: Selection,
        backend: &impl ImageBackend,
        destination: &Path,
        mode: PublishMode,
    ) -> Result<Published, PickError> {
        let Some(item) = &selection.item else {
            error!(partition = %selection.partition, "read failure, nothing to publish");
            return Err(PickError::EmptySelection {
                partition: selection.partition,
            });
        };

        let staged = publish::stage(destination)?;
        let dimensions = imaging::prepare_image(
            backend,
            &item.path,
            staged.path(),
            &selection.annotation(),
            &self.prepare,
        )?;
        let published = staged.finish(mode)?;
        match &published {
            Some(dest) => info!(destination = %dest.display(), "published image"),
            None => info!(destination = %destination.display(), "dry run, destination left unchanged"),
        }

        Ok(Published {
            selection,
            dimensions,
            destination: published,
        })
    }

    /// Pick a photo and publish it.
    pub fn run(
        &self,
        backend: &impl ImageBackend,
        destination: &Path,
        mode: PublishMode,
    ) -> Result<Published, PickError> {
        let selection = self.pick()?;
        self.publish(selection, backend, destination, mode)
    }
}

/// Build the production backend from config. A font that cannot be loaded
/// is logged and the backend runs without labels.
pub fn backend_from_config(config: &PickerConfig) -> RustBackend {
    if !config.annotation.enabled {
        return RustBackend::new();
    }
    match config.annotation.resolve_font() {
        Some(path) => match RustBackend::with_font_file(&path) {
            Ok(backend) => backend,
            Err(e) => {
                warn!(font = %path.display(), "cannot load font: {e}");
                RustBackend::new()
            }
        },
        None => {
            debug!("no annotation font found");
            RustBackend::new()
        }
    }
}
