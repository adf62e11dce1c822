//! # Label Data Model
//!
//! [`LabelData`] is the immutable snapshot of what goes on one label. Both
//! output encodings (printer markup and the rasterized document) are pure
//! functions of it.
//!
//! ## Derived Identifiers
//!
//! ```text
//! article       = {product}-{yyyymmdd}-{sequence:03}
//! barcode_value = {yyyymmdd}-{product}-{sequence:03}-{weight or 0}
//! ```
//!
//! ## Example
//!
//! ```
//! use chrono::NaiveDate;
//! use etiketka::label::{LabelData, ProductCode, Weight};
//! use etiketka::printer::LabelSize;
//!
//! let data = LabelData::new(
//!     NaiveDate::from_ymd_opt(2023, 10, 25).unwrap(),
//!     ProductCode::LF,
//!     1,
//!     Weight::parse("15.5").unwrap(),
//!     LabelSize::Small,
//! ).unwrap();
//!
//! assert_eq!(data.article(), "LF-20231025-001");
//! assert_eq!(data.barcode_value(), "20231025-LF-001-15.5");
//! ```

pub mod form;
pub mod product;
pub mod weight;

pub use form::LabelForm;
pub use product::ProductCode;
pub use weight::Weight;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::LabelError;
use crate::printer::LabelSize;

/// Snapshot of one label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelData {
    date: NaiveDate,
    product: ProductCode,
    sequence: u32,
    weight: Weight,
    size: LabelSize,
}

impl LabelData {
    /// Build a snapshot. Fails if `sequence` is zero.
    pub fn new(
        date: NaiveDate,
        product: ProductCode,
        sequence: u32,
        weight: Weight,
        size: LabelSize,
    ) -> Result<Self, LabelError> {
        if sequence == 0 {
            return Err(LabelError::InvalidSequence(sequence.to_string()));
        }
        Ok(Self {
            date,
            product,
            sequence,
            weight,
            size,
        })
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn product(&self) -> ProductCode {
        self.product
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    pub fn weight(&self) -> &Weight {
        &self.weight
    }

    pub fn size(&self) -> LabelSize {
        self.size
    }

    /// Same label in another physical format.
    pub fn with_size(mut self, size: LabelSize) -> Self {
        self.size = size;
        self
    }

    /// Date without separators (`20231025`).
    pub fn compact_date(&self) -> String {
        self.date.format("%Y%m%d").to_string()
    }

    /// Date for humans (`25.10.2023`).
    pub fn display_date(&self) -> String {
        self.date.format("%d.%m.%Y").to_string()
    }

    /// Sequence zero-padded to three digits, never truncated.
    pub fn padded_sequence(&self) -> String {
        format!("{:03}", self.sequence)
    }

    /// Human-readable identifier, e.g. `LF-20231025-001`.
    pub fn article(&self) -> String {
        format!(
            "{}-{}-{}",
            self.product,
            self.compact_date(),
            self.padded_sequence()
        )
    }

    /// Machine-readable barcode payload, e.g. `20231025-LF-001-15.5`.
    pub fn barcode_value(&self) -> String {
        format!(
            "{}-{}-{}-{}",
            self.compact_date(),
            self.product,
            self.padded_sequence(),
            self.weight.barcode_segment()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(sequence: u32, weight: &str) -> LabelData {
        LabelData::new(
            NaiveDate::from_ymd_opt(2023, 10, 25).unwrap(),
            ProductCode::LF,
            sequence,
            Weight::parse(weight).unwrap(),
            LabelSize::Small,
        )
        .unwrap()
    }

    #[test]
    fn test_reference_example() {
        let data = label(1, "15.5");
        assert_eq!(data.article(), "LF-20231025-001");
        assert_eq!(data.barcode_value(), "20231025-LF-001-15.5");
    }

    #[test]
    fn test_sequence_padding() {
        assert_eq!(label(1, "").padded_sequence(), "001");
        assert_eq!(label(42, "").padded_sequence(), "042");
        assert_eq!(label(1000, "").padded_sequence(), "1000");
    }

    #[test]
    fn test_unset_weight_in_barcode() {
        assert_eq!(label(7, "").barcode_value(), "20231025-LF-007-0");
    }

    #[test]
    fn test_dates() {
        let data = label(1, "");
        assert_eq!(data.compact_date(), "20231025");
        assert_eq!(data.display_date(), "25.10.2023");
    }

    #[test]
    fn test_zero_sequence_rejected() {
        let result = LabelData::new(
            NaiveDate::from_ymd_opt(2023, 10, 25).unwrap(),
            ProductCode::SF,
            0,
            Weight::new(),
            LabelSize::Large,
        );
        assert!(matches!(result, Err(LabelError::InvalidSequence(_))));
    }

    #[test]
    fn test_derived_values_are_deterministic() {
        let a = label(3, "2.25");
        let b = a.clone();
        assert_eq!(a.article(), b.article());
        assert_eq!(a.barcode_value(), b.barcode_value());
    }
}
