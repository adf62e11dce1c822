//! # Label Rasterization
//!
//! Renders a [`LabelLayout`] into an 8-bit grayscale bitmap at a fixed
//! resolution. The output is a pure function of the layout, the font and the
//! resolution, so the same label always produces the same pixels.
//!
//! ## Resolution
//!
//! The default of 12 px/mm (≈305 dpi) gives 696 × 360 px for the small label
//! and 1200 × 1200 px for the large one.

use image::{GrayImage, Luma};

use super::barcode::encode_code128;
use super::font::{LabelFont, TextBitmap};
use super::layout::{Align, Element, LabelLayout};
use crate::error::LabelError;
use crate::printer::LabelFormat;

/// Default raster resolution in pixels per millimetre.
pub const DEFAULT_PX_PER_MM: f32 = 12.0;

/// Gap between barcode bars and the human-readable line (mm).
const BARCODE_TEXT_GAP_MM: f32 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterConfig {
    pub px_per_mm: f32,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            px_per_mm: DEFAULT_PX_PER_MM,
        }
    }
}

/// Ink buffer: 0.0 = paper, 1.0 = black.
struct Canvas {
    width: usize,
    height: usize,
    ink: Vec<f32>,
}

impl Canvas {
    fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            ink: vec![0.0; width * height],
        }
    }

    fn blend(&mut self, x: i64, y: i64, ink: f32) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let idx = y as usize * self.width + x as usize;
        if ink > self.ink[idx] {
            self.ink[idx] = ink;
        }
    }

    fn fill_rect(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, ink: f32) {
        for y in y0.max(0)..y1.min(self.height as i64) {
            for x in x0.max(0)..x1.min(self.width as i64) {
                self.blend(x, y, ink);
            }
        }
    }

    fn stamp(&mut self, bitmap: &TextBitmap, x0: i64, y0: i64, ink: f32) {
        for y in 0..bitmap.height {
            for x in 0..bitmap.width {
                let coverage = bitmap.at(x, y);
                if coverage > 0.0 {
                    self.blend(x0 + x as i64, y0 + y as i64, coverage * ink);
                }
            }
        }
    }

    fn into_image(self) -> GrayImage {
        let mut img = GrayImage::new(self.width as u32, self.height as u32);
        for (i, ink) in self.ink.iter().enumerate() {
            let x = (i % self.width) as u32;
            let y = (i / self.width) as u32;
            let luma = 255.0 - (ink.clamp(0.0, 1.0) * 255.0);
            img.put_pixel(x, y, Luma([luma.round() as u8]));
        }
        img
    }
}

/// Render a layout to a bitmap sized to the physical label.
pub fn rasterize(
    layout: &LabelLayout,
    font: &LabelFont,
    config: &RasterConfig,
) -> Result<GrayImage, LabelError> {
    if !(config.px_per_mm > 0.0) {
        return Err(LabelError::Raster(format!(
            "Invalid resolution: {} px/mm",
            config.px_per_mm
        )));
    }

    let px = config.px_per_mm;
    let (width, height) = LabelFormat::for_size(layout.size).size_pixels(px);
    if width == 0 || height == 0 {
        return Err(LabelError::Raster("Empty label canvas".to_string()));
    }

    let mut canvas = Canvas::new(width as usize, height as usize);
    let margin = mm(layout.margin_mm, px);
    let max_text_width = (width as i64 - 2 * margin).max(1) as usize;

    for element in &layout.elements {
        match element {
            Element::Text {
                text,
                x_mm,
                y_mm,
                height_mm,
                align,
                bold,
                tone,
            } => {
                let bitmap = fit_text(font, text, height_mm * px, max_text_width);
                let anchor = mm(*x_mm, px);
                let left = match align {
                    Align::Left => anchor,
                    Align::Center => anchor - bitmap.width as i64 / 2,
                    Align::Right => anchor - bitmap.width as i64,
                };
                let top = mm(*y_mm, px);
                canvas.stamp(&bitmap, left, top, tone.ink());
                if *bold {
                    let offset = ((px / 8.0).round() as i64).max(1);
                    canvas.stamp(&bitmap, left + offset, top, tone.ink());
                }
            }
            Element::Barcode {
                value,
                x_mm,
                y_mm,
                width_mm,
                height_mm,
                text_height_mm,
            } => {
                let modules = encode_code128(value)?;
                let box_width = mm(*width_mm, px);
                let module_px = box_width / modules.len() as i64;
                if module_px == 0 {
                    // Clipped bars do not scan
                    return Err(LabelError::Raster(format!(
                        "Barcode needs {} px but only {} px fit at {} px/mm",
                        modules.len(),
                        box_width,
                        px
                    )));
                }
                let bars_width = module_px * modules.len() as i64;
                let left = mm(*x_mm, px) + (box_width - bars_width).max(0) / 2;
                let top = mm(*y_mm, px);
                let bottom = top + mm(*height_mm, px);

                for (i, is_bar) in modules.iter().enumerate() {
                    if *is_bar {
                        let x = left + i as i64 * module_px;
                        canvas.fill_rect(x, top, x + module_px, bottom, 1.0);
                    }
                }

                let caption = fit_text(font, value, text_height_mm * px, max_text_width);
                let center = left + bars_width / 2;
                canvas.stamp(
                    &caption,
                    center - caption.width as i64 / 2,
                    bottom + mm(BARCODE_TEXT_GAP_MM, px),
                    1.0,
                );
            }
            Element::Logo {
                x_mm,
                y_mm,
                size_mm,
            } => draw_logo(&mut canvas, mm(*x_mm, px), mm(*y_mm, px), mm(*size_mm, px)),
            Element::Rule {
                x_mm,
                y_mm,
                width_mm,
                thickness_mm,
            } => {
                let x = mm(*x_mm, px);
                let y = mm(*y_mm, px);
                let thickness = mm(*thickness_mm, px).max(1);
                canvas.fill_rect(x, y, x + mm(*width_mm, px), y + thickness, 1.0);
            }
        }
    }

    Ok(canvas.into_image())
}

#[inline]
fn mm(value: f32, px_per_mm: f32) -> i64 {
    (value * px_per_mm).round() as i64
}

/// Render text, shrinking it until it fits `max_width`.
fn fit_text(font: &LabelFont, text: &str, pixel_height: f32, max_width: usize) -> TextBitmap {
    let bitmap = font.render(text, pixel_height);
    if bitmap.width <= max_width {
        return bitmap;
    }
    let scaled = pixel_height * max_width as f32 / bitmap.width as f32;
    font.render(text, scaled.floor().max(1.0))
}

/// Leaf mark: a vertical lens (two intersecting circles) with a short stem.
fn draw_logo(canvas: &mut Canvas, x0: i64, y0: i64, size: i64) {
    if size <= 0 {
        return;
    }
    let s = size as f32;
    let radius = s * 0.42;
    let offset = s * 0.22;
    let cx = x0 as f32 + s / 2.0;
    let cy = y0 as f32 + s * 0.42;

    for y in y0..y0 + size {
        for x in x0..x0 + size {
            let fx = x as f32 + 0.5;
            let fy = y as f32 + 0.5;
            let left = (fx - (cx - offset)).powi(2) + (fy - cy).powi(2);
            let right = (fx - (cx + offset)).powi(2) + (fy - cy).powi(2);
            if left <= radius * radius && right <= radius * radius {
                canvas.blend(x, y, 1.0);
            }
        }
    }

    let stem_half = (size / 24).max(1);
    let stem_top = (cy + radius * 0.6) as i64;
    let cx = cx as i64;
    canvas.fill_rect(cx - stem_half, stem_top, cx + stem_half, y0 + size, 1.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::{LabelData, ProductCode, Weight};
    use crate::printer::LabelSize;
    use chrono::NaiveDate;

    fn layout(size: LabelSize) -> LabelLayout {
        let data = LabelData::new(
            NaiveDate::from_ymd_opt(2023, 10, 25).unwrap(),
            ProductCode::LF,
            1,
            Weight::parse("15.5").unwrap(),
            size,
        )
        .unwrap();
        LabelLayout::build(&data)
    }

    #[test]
    fn test_bitmap_matches_label_size() {
        let config = RasterConfig::default();
        let small = rasterize(&layout(LabelSize::Small), &LabelFont::Builtin, &config).unwrap();
        assert_eq!(small.dimensions(), (696, 360));
        let large = rasterize(&layout(LabelSize::Large), &LabelFont::Builtin, &config).unwrap();
        assert_eq!(large.dimensions(), (1200, 1200));
    }

    #[test]
    fn test_pixel_stable() {
        let config = RasterConfig { px_per_mm: 8.0 };
        let a = rasterize(&layout(LabelSize::Small), &LabelFont::Builtin, &config).unwrap();
        let b = rasterize(&layout(LabelSize::Small), &LabelFont::Builtin, &config).unwrap();
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn test_has_ink_and_paper() {
        let img = rasterize(
            &layout(LabelSize::Small),
            &LabelFont::Builtin,
            &RasterConfig::default(),
        )
        .unwrap();
        assert!(img.as_raw().iter().any(|&p| p == 0));
        assert!(img.as_raw().iter().any(|&p| p == 255));
        // Corner stays blank
        assert_eq!(img.get_pixel(0, 0)[0], 255);
    }

    #[test]
    fn test_barcode_band_is_inked() {
        let img = rasterize(
            &layout(LabelSize::Small),
            &LabelFont::Builtin,
            &RasterConfig::default(),
        )
        .unwrap();
        // Row through the middle of the bars (y = 14 mm + 5 mm)
        let y = (19.0 * DEFAULT_PX_PER_MM) as u32;
        let black = (0..img.width()).filter(|&x| img.get_pixel(x, y)[0] == 0).count();
        assert!(black > 50, "expected bars on row {}, found {} black px", y, black);
    }

    #[test]
    fn test_barcode_wider_than_box_is_rejected() {
        // 255 modules, 55 mm box: 220 px at 4 px/mm
        let result = rasterize(
            &layout(LabelSize::Small),
            &LabelFont::Builtin,
            &RasterConfig { px_per_mm: 4.0 },
        );
        assert!(matches!(result, Err(LabelError::Raster(_))));

        let fits = rasterize(
            &layout(LabelSize::Small),
            &LabelFont::Builtin,
            &RasterConfig { px_per_mm: 5.0 },
        );
        assert!(fits.is_ok());
    }

    #[test]
    fn test_invalid_resolution() {
        let result = rasterize(
            &layout(LabelSize::Small),
            &LabelFont::Builtin,
            &RasterConfig { px_per_mm: 0.0 },
        );
        assert!(matches!(result, Err(LabelError::Raster(_))));
    }
}
