//! # Visual Rendering
//!
//! The visual half of the encoding engine: a millimetre-based layout of the
//! label and its rasterization.
//!
//! ## Submodules
//!
//! - [`layout`]: Positioned elements for each label size
//! - [`raster`]: Layout → grayscale bitmap
//! - [`font`]: Bitmap and TTF text rendering
//! - [`barcode`]: Code 128 module encoding
//!
//! ## Pipeline
//!
//! ```text
//! LabelData → LabelLayout → rasterize() → GrayImage → PNG preview / PDF page
//! ```

pub mod barcode;
pub mod font;
pub mod layout;
pub mod raster;

pub use font::{FontSource, LabelFont};
pub use layout::LabelLayout;
pub use raster::{RasterConfig, rasterize};

use image::{GrayImage, ImageFormat};
use std::io::Cursor;

use crate::error::LabelError;
use crate::label::LabelData;

/// Render a label straight to a bitmap.
pub fn render_label(
    data: &LabelData,
    font: &LabelFont,
    config: &RasterConfig,
) -> Result<GrayImage, LabelError> {
    rasterize(&LabelLayout::build(data), font, config)
}

/// Encode a bitmap as PNG bytes for previews.
pub fn to_png(image: &GrayImage) -> Result<Vec<u8>, LabelError> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| LabelError::Raster(format!("PNG encoding failed: {}", e)))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::{ProductCode, Weight};
    use crate::printer::LabelSize;
    use chrono::NaiveDate;

    #[test]
    fn test_png_signature() {
        let data = LabelData::new(
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            ProductCode::NS,
            5,
            Weight::new(),
            LabelSize::Small,
        )
        .unwrap();
        let config = RasterConfig { px_per_mm: 6.0 };
        let img = render_label(&data, &LabelFont::Builtin, &config).unwrap();
        let png = to_png(&img).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }
}
