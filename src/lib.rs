//! # Photo Picker
//!
//! Picks one photo at random from a large, year-partitioned archive and
//! publishes it to a fixed file, for a photo frame or dashboard to display.
//!
//! ```text
//! photos/
//! ├── 2021/            # a partition: any immediate subdirectory of the root
//! │   └── ...
//! ├── 2022/
//! │   ├── IMG_0001.jpg
//! │   └── trip/        # nesting below a partition is fine
//! │       └── IMG_0042.JPG
//! └── 2023/
//! ```
//!
//! # Architecture: Two Operations, One Cache
//!
//! ```text
//! generate  root     →  weights.csv   (count matching files per partition)
//! pick      weights  →  destination   (weighted partition, uniform item, prepare, swap)
//! ```
//!
//! Counting an archive with hundreds of thousands of files is slow; picking
//! one should not be. `generate` stores only per-partition counts, and `pick`
//! reuses them until the cache is older than the staleness window, then
//! regenerates. The item list of the chosen partition is always read fresh.
//!
//! Selection is two-stage: a partition is drawn in proportion to its count,
//! then one file is drawn uniformly inside it. While the cache is current this
//! is the same as a uniform draw over the whole archive.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Counts matching files per partition; the loose extension matcher |
//! | [`weights`] | The weight table and its CSV cache file |
//! | [`staleness`] | Decides when the cache must be regenerated |
//! | [`select`] | Two-stage weighted selection and path sanitising |
//! | [`pick`] | Orchestrates generate, ensure-fresh, pick and publish |
//! | [`imaging`] | Resize, annotate and encode the chosen photo |
//! | [`publish`] | Atomic swap of the prepared image over the destination |
//! | [`config`] | `config.toml` loading, stock defaults and validation |
//! | [`logging`] | `tracing` subscriber setup |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## A CSV Cache
//!
//! The cache is two columns, `Dir,Count`, sorted by partition name. It can be
//! read, edited, or pruned by hand, and a diff between two generations shows
//! exactly which years changed.
//!
//! ## Readers Never See a Partial Image
//!
//! The prepared image is written beside the destination and renamed over it.
//! See [`publish`].
//!
//! ## Drift Is Expected
//!
//! Files move between cache generations. A partition that has emptied since
//! the last scan yields a [`select::Selection`] without an item; the run fails
//! without touching the destination and the next run tries again.

pub mod config;
pub mod imaging;
pub mod logging;
pub mod output;
pub mod pick;
pub mod publish;
pub mod scan;
pub mod select;
pub mod staleness;
pub mod weights;

#[cfg(test)]
pub(crate) mod test_helpers;
