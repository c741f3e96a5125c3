//! End-to-end runs of generate and pick against a real directory tree.
//!
//! Run with: cargo test --test end_to_end

use image::{ImageEncoder, RgbImage};
use photo_picker::config::PickerConfig;
use photo_picker::imaging::RustBackend;
use photo_picker::pick::{PickError, Picker};
use photo_picker::publish::PublishMode;
use photo_picker::weights::{self, PartitionWeight};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_jpeg(path: &Path, width: u32, height: u32) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 96])
    });
    let file = fs::File::create(path).unwrap();
    image::codecs::jpeg::JpegEncoder::new(std::io::BufWriter::new(file))
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

/// 2022 holds three photos (one nested, one upper-case), 2023 one, and
/// 2024 only non-photo files.
fn archive() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write_jpeg(&root.join("2022/a.jpg"), 40, 30);
    write_jpeg(&root.join("2022/trip/b.JPEG"), 40, 30);
    write_jpeg(&root.join("2022/c.jpg"), 40, 30);
    fs::write(root.join("2022/notes.txt"), "not a photo").unwrap();
    write_jpeg(&root.join("2023/d.jpg"), 40, 30);
    fs::create_dir_all(root.join("2024")).unwrap();
    fs::write(root.join("2024/readme.md"), "empty year").unwrap();
    fs::write(root.join("loose.jpg"), "files at the root are not partitions").unwrap();
    tmp
}

fn record(name: &str, count: u64) -> PartitionWeight {
    PartitionWeight {
        name: name.to_string(),
        count,
    }
}

#[test]
fn generate_counts_matching_files_per_partition() {
    let photos = archive();
    let out = TempDir::new().unwrap();
    let cache = out.path().join("weights.csv");

    let table = Picker::new(&PickerConfig::default(), photos.path(), &cache)
        .generate()
        .unwrap();

    assert_eq!(table.records(), &[record("2022", 3), record("2023", 1)]);
    assert_eq!(weights::read(&cache).unwrap(), table);
}

#[test]
fn picks_follow_partition_weights() {
    let photos = archive();
    let out = TempDir::new().unwrap();
    let picker = Picker::new(
        &PickerConfig::default(),
        photos.path(),
        &out.path().join("weights.csv"),
    );
    let mut rng = StdRng::seed_from_u64(2022);

    let trials = 4000;
    let mut from_2022 = 0;
    for _ in 0..trials {
        let selection = picker.pick_with(&mut rng).unwrap();
        let item = selection.item.as_ref().unwrap();
        assert!(item.path.starts_with(photos.path().join(&selection.partition)));
        assert!(item.path.is_file());
        if selection.partition == "2022" {
            from_2022 += 1;
        }
    }

    let share = from_2022 as f64 / trials as f64;
    assert!((share - 0.75).abs() < 0.04, "2022 share {share:.3}");
}

#[test]
fn expired_cache_is_regenerated_on_pick() {
    let photos = archive();
    let out = TempDir::new().unwrap();
    let cache = out.path().join("weights.csv");
    fs::write(&cache, "Dir,Count\n1999,10\n").unwrap();

    let mut config = PickerConfig::default();
    config.cache.max_age_hours = 0;
    let selection = Picker::new(&config, photos.path(), &cache).pick().unwrap();

    assert_ne!(selection.partition, "1999");
    let names: Vec<String> = weights::read(&cache)
        .unwrap()
        .iter()
        .map(|r| r.name.clone())
        .collect();
    assert_eq!(names, vec!["2022", "2023"]);
}

#[test]
fn stale_entry_in_fresh_cache_fails_without_publishing() {
    let photos = archive();
    let out = TempDir::new().unwrap();
    let cache = out.path().join("weights.csv");
    let dest = out.path().join("frame.jpg");
    fs::write(&cache, "Dir,Count\n1999,10\n").unwrap();
    fs::write(&dest, b"yesterday").unwrap();

    let picker = Picker::new(&PickerConfig::default(), photos.path(), &cache);
    let result = picker.run(&RustBackend::new(), &dest, PublishMode::Replace);

    assert!(matches!(
        result,
        Err(PickError::EmptySelection { partition }) if partition == "1999"
    ));
    assert_eq!(fs::read(&dest).unwrap(), b"yesterday");
}

#[test]
fn pick_publishes_resized_image() {
    let photos = TempDir::new().unwrap();
    write_jpeg(&photos.path().join("2022/wide.jpg"), 400, 200);
    let out = TempDir::new().unwrap();
    let dest = out.path().join("frame.jpg");

    let mut config = PickerConfig::default();
    config.image.max_dimension = 100;
    config.annotation.enabled = false;
    let picker = Picker::new(&config, photos.path(), &out.path().join("weights.csv"));
    let backend = RustBackend::new();

    let published = picker.run(&backend, &dest, PublishMode::Replace).unwrap();
    assert_eq!(published.destination.as_deref(), Some(dest.as_path()));
    assert_eq!(published.selection.partition, "2022");

    assert_eq!(image::image_dimensions(&dest).unwrap(), (100, 50));
}

#[test]
fn dry_run_leaves_destination_untouched() {
    let photos = archive();
    let out = TempDir::new().unwrap();
    let dest = out.path().join("frame.jpg");
    fs::write(&dest, b"yesterday").unwrap();

    let mut config = PickerConfig::default();
    config.annotation.enabled = false;
    let picker = Picker::new(&config, photos.path(), &out.path().join("weights.csv"));

    let published = picker
        .run(&RustBackend::new(), &dest, PublishMode::DryRun)
        .unwrap();
    assert!(published.destination.is_none());
    assert_eq!(fs::read(&dest).unwrap(), b"yesterday");
}
