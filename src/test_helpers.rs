//! Shared fixtures for unit tests.
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let tmp = year_tree(&[
//!     ("2022", &["a.jpg", "trip/b.jpg"]),
//!     ("2023", &["c.jpg"]),
//! ]);
//! let weights = table(&[("2022", 2), ("2023", 1)]);
//! ```

use crate::weights::{PartitionWeight, WeightTable};
use image::{ImageEncoder, RgbImage};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Build a photo root in a temp dir: one directory per partition, each
/// holding the listed files. File names may contain `/` for nesting.
///
/// Files are empty; the scanner and selector only look at names.
pub fn year_tree(partitions: &[(&str, &[&str])]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    for (partition, files) in partitions {
        let dir = tmp.path().join(partition);
        fs::create_dir_all(&dir).unwrap();
        for file in *files {
            touch(&dir.join(file));
        }
    }
    tmp
}

/// Create an empty file, and its parent directories.
pub fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, b"").unwrap();
}

pub fn table(rows: &[(&str, u64)]) -> WeightTable {
    WeightTable::from_records(
        rows.iter()
            .map(|(name, count)| PartitionWeight {
                name: name.to_string(),
                count: *count,
            })
            .collect(),
    )
    .unwrap()
}

/// Write a small gradient JPEG.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let file = fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new(writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}
