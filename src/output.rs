//! CLI output formatting.
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure.
//!
//! # Generate
//!
//! ```text
//! 2021    120
//! 2022  3,004
//! 2023     15
//! 3 partitions, 3,139 photos
//! ```
//!
//! # Pick
//!
//! One line, partition then escaped item path, for scripts to consume:
//!
//! ```text
//! 2022 /photos/2022/trip/IMG_0042.jpg
//! ```

use crate::pick::Published;
use crate::select::Selection;
use crate::weights::WeightTable;

/// Group digits in threes: `3004` → `3,004`.
fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

/// One aligned row per partition plus a summary line.
pub fn format_weight_table(table: &WeightTable) -> Vec<String> {
    let name_width = table.iter().map(|r| r.name.len()).max().unwrap_or(0);
    let counts: Vec<String> = table.iter().map(|r| thousands(r.count)).collect();
    let count_width = counts.iter().map(String::len).max().unwrap_or(0);

    let mut lines: Vec<String> = table
        .iter()
        .zip(&counts)
        .map(|(r, c)| format!("{:<name_width$}  {:>count_width$}", r.name, c))
        .collect();
    lines.push(format!(
        "{}, {}",
        plural(table.len(), "partition", "partitions"),
        if table.total() == 1 {
            "1 photo".to_string()
        } else {
            format!("{} photos", thousands(table.total()))
        }
    ));
    lines
}

/// `"<partition> <item_path>"`. The item path is empty for an empty
/// selection, leaving a trailing space.
pub fn format_selection(selection: &Selection) -> String {
    format!("{} {}", selection.partition, selection.item_path())
}

pub fn format_published(published: &Published) -> Vec<String> {
    let size = format!(
        "{}x{}",
        published.dimensions.width, published.dimensions.height
    );
    match &published.destination {
        Some(dest) => vec![format!("Published {size} → {}", dest.display())],
        None => vec![format!("Dry run: prepared {size}, destination unchanged")],
    }
}

pub fn print_weight_table(table: &WeightTable) {
    for line in format_weight_table(table) {
        println!("{}", line);
    }
}

pub fn print_selection(selection: &Selection) {
    println!("{}", format_selection(selection));
}

pub fn print_published(published: &Published) {
    for line in format_published(published) {
        println!("{}", line);
    }
}
