//! # Golden Tests
//!
//! These tests ensure that label markup encoding produces stable output.
//!
//! ## Test Coverage
//!
//! - **Markup** (`.zpl`): one label per layout, plus the empty-weight case.
//!   Files end with a newline; the encoder output does not, so comparison
//!   ignores trailing whitespace.
//! - **Raster**: pixel determinism for both sizes (no files, the built-in
//!   font output is compared against a second rendering).
//!
//! ## Regenerating Golden Files
//!
//! ```bash
//! cargo test --test golden_tests generate_golden_files -- --ignored
//! ```

use chrono::NaiveDate;
use etiketka::protocol::markup;
use etiketka::render::{LabelFont, RasterConfig, render_label};
use etiketka::{LabelData, LabelSize, ProductCode, Weight};
use pretty_assertions::assert_eq;
use std::fs;

/// Path to golden test directory
const GOLDEN_DIR: &str = "tests/golden";

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn label(
    date: (i32, u32, u32),
    product: ProductCode,
    sequence: u32,
    weight: &str,
    size: LabelSize,
) -> LabelData {
    LabelData::new(
        NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
        product,
        sequence,
        Weight::parse(weight).unwrap(),
        size,
    )
    .unwrap()
}

/// The labels covered by golden files.
fn golden_labels() -> Vec<(&'static str, LabelData)> {
    vec![
        (
            "small_lf",
            label((2023, 10, 25), ProductCode::LF, 1, "15.5", LabelSize::Small),
        ),
        (
            "large_cs",
            label((2023, 10, 25), ProductCode::CS, 42, "120.50", LabelSize::Large),
        ),
        (
            "small_ds_empty",
            label((2024, 1, 2), ProductCode::DS, 7, "", LabelSize::Small),
        ),
    ]
}

/// Compare markup against a golden file
fn check_golden(name: &str, actual: &str) {
    let path = format!("{}/{}.zpl", GOLDEN_DIR, name);
    let golden = fs::read_to_string(&path).unwrap_or_else(|_| {
        panic!(
            "Golden file not found: {}. Run the generator to create it.",
            path
        )
    });
    assert_eq!(actual.trim_end(), golden.trim_end(), "mismatch in {}", path);
}

// ============================================================================
// GOLDEN FILE GENERATOR
// ============================================================================

#[test]
#[ignore]
fn generate_golden_files() {
    fs::create_dir_all(GOLDEN_DIR).unwrap();
    for (name, data) in golden_labels() {
        let path = format!("{}/{}.zpl", GOLDEN_DIR, name);
        let zpl = markup::encode(&data);
        fs::write(&path, format!("{}\n", zpl)).unwrap();
        println!("Wrote {} ({} bytes)", path, zpl.len());
    }
}

// ============================================================================
// MARKUP
// ============================================================================

#[test]
fn test_markup_small_lf() {
    let (name, data) = &golden_labels()[0];
    check_golden(name, &markup::encode(data));
}

#[test]
fn test_markup_large_cs() {
    let (name, data) = &golden_labels()[1];
    check_golden(name, &markup::encode(data));
}

#[test]
fn test_markup_empty_weight() {
    let (name, data) = &golden_labels()[2];
    check_golden(name, &markup::encode(data));
}

#[test]
fn test_markup_envelope() {
    for (_, data) in golden_labels() {
        let zpl = markup::encode(&data);
        assert!(zpl.starts_with("^XA"));
        assert!(zpl.ends_with("^XZ"));
        assert_eq!(zpl.trim(), zpl);
        assert_eq!(zpl.matches("^XA").count(), 1);
        assert_eq!(zpl.matches("^XZ").count(), 1);
        assert!(zpl.contains(&format!("^FD{}^FS", data.barcode_value())));
    }
}

#[test]
fn test_reference_example() {
    let data = label((2023, 10, 25), ProductCode::LF, 1, "15.5", LabelSize::Small);
    assert_eq!(data.barcode_value(), "20231025-LF-001-15.5");
    assert_eq!(data.article(), "LF-20231025-001");
    assert_eq!(markup::artifact_name(&data), "label-LF-20231025-001.zpl");
}

// ============================================================================
// RASTER
// ============================================================================

#[test]
fn test_raster_determinism() {
    let config = RasterConfig { px_per_mm: 6.0 };
    for size in LabelSize::ALL {
        let data = label((2023, 10, 25), ProductCode::SF, 3, "7.25", size);
        let a = render_label(&data, &LabelFont::Builtin, &config).unwrap();
        let b = render_label(&data, &LabelFont::Builtin, &config).unwrap();
        assert_eq!(a.dimensions(), b.dimensions());
        assert!(a.as_raw() == b.as_raw(), "raster output differs for {}", size);
    }
}
