//! # Label Formats
//!
//! This module defines the physical label formats the line prints on.
//!
//! ## Supported Formats
//!
//! | Size | Label (mm) | Dots (8/mm) | PDF orientation |
//! |------|------------|-------------|-----------------|
//! | Small | 58 × 30 | 464 × 240 | Landscape |
//! | Large | 100 × 100 | 800 × 800 | Portrait |
//!
//! ## Usage
//!
//! ```
//! use etiketka::printer::{LabelFormat, LabelSize};
//!
//! let format = LabelFormat::for_size(LabelSize::Small);
//! assert_eq!(format.width_dots(), 464);
//! assert_eq!(format.height_dots(), 240);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::LabelError;

/// Dot density assumed for direct markup printers (203 dpi).
pub const DOTS_PER_MM: u32 = 8;

/// Points per millimetre in PDF user space.
pub const POINTS_PER_MM: f32 = 72.0 / 25.4;

/// Physical label format selected by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelSize {
    /// 58 × 30 mm sticker
    #[default]
    Small,
    /// 100 × 100 mm pallet label
    Large,
}

impl LabelSize {
    pub const ALL: [LabelSize; 2] = [LabelSize::Small, LabelSize::Large];

    /// Name as shown to the operator (`58x30`, `100x100`).
    pub fn as_str(&self) -> &'static str {
        match self {
            LabelSize::Small => "58x30",
            LabelSize::Large => "100x100",
        }
    }

    pub fn format(&self) -> &'static LabelFormat {
        LabelFormat::for_size(*self)
    }
}

impl fmt::Display for LabelSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LabelSize {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "58x30" | "small" => Ok(LabelSize::Small),
            "100x100" | "large" => Ok(LabelSize::Large),
            other => Err(LabelError::UnknownSize(other.to_string())),
        }
    }
}

/// Page orientation of the printable document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Landscape,
    Portrait,
}

/// # Label Format
///
/// Physical dimensions of one label and the derived dot grid.
///
/// ## Calculations
///
/// ```text
/// width_dots = width_mm × 8
///
/// For the small label:
///   58 mm × 8 = 464 dots
///   30 mm × 8 = 240 dots
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelFormat {
    pub size: LabelSize,

    /// Label width in millimetres
    pub width_mm: u32,

    /// Label height in millimetres
    pub height_mm: u32,

    pub orientation: Orientation,
}

impl LabelFormat {
    pub const SMALL: Self = Self {
        size: LabelSize::Small,
        width_mm: 58,
        height_mm: 30,
        orientation: Orientation::Landscape,
    };

    pub const LARGE: Self = Self {
        size: LabelSize::Large,
        width_mm: 100,
        height_mm: 100,
        orientation: Orientation::Portrait,
    };

    pub fn for_size(size: LabelSize) -> &'static Self {
        match size {
            LabelSize::Small => &Self::SMALL,
            LabelSize::Large => &Self::LARGE,
        }
    }

    /// Markup canvas width (`^PW`)
    #[inline]
    pub fn width_dots(&self) -> u32 {
        self.width_mm * DOTS_PER_MM
    }

    /// Markup canvas height (`^LL`)
    #[inline]
    pub fn height_dots(&self) -> u32 {
        self.height_mm * DOTS_PER_MM
    }

    /// Page size in PDF points.
    #[inline]
    pub fn size_points(&self) -> (f32, f32) {
        (
            self.width_mm as f32 * POINTS_PER_MM,
            self.height_mm as f32 * POINTS_PER_MM,
        )
    }

    /// Bitmap size for a given raster resolution.
    #[inline]
    pub fn size_pixels(&self, px_per_mm: f32) -> (u32, u32) {
        (
            (self.width_mm as f32 * px_per_mm).round() as u32,
            (self.height_mm as f32 * px_per_mm).round() as u32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_dots() {
        let format = LabelFormat::SMALL;
        assert_eq!(format.width_dots(), 464);
        assert_eq!(format.height_dots(), 240);
        assert_eq!(format.orientation, Orientation::Landscape);
    }

    #[test]
    fn test_large_dots() {
        let format = LabelFormat::LARGE;
        assert_eq!(format.width_dots(), 800);
        assert_eq!(format.height_dots(), 800);
        assert_eq!(format.orientation, Orientation::Portrait);
    }

    #[test]
    fn test_size_points() {
        let (w, h) = LabelFormat::SMALL.size_points();
        assert!((w - 164.41).abs() < 0.01);
        assert!((h - 85.04).abs() < 0.01);
    }

    #[test]
    fn test_size_pixels() {
        assert_eq!(LabelFormat::SMALL.size_pixels(12.0), (696, 360));
        assert_eq!(LabelFormat::LARGE.size_pixels(12.0), (1200, 1200));
    }

    #[test]
    fn test_parse_size() {
        assert_eq!("58x30".parse::<LabelSize>().unwrap(), LabelSize::Small);
        assert_eq!("LARGE".parse::<LabelSize>().unwrap(), LabelSize::Large);
        assert!("a4".parse::<LabelSize>().is_err());
    }
}
