//! Text rasterization for the visual label.
//!
//! Two font sources are supported:
//!
//! - **Built-in**: the Spleen 12×24 bitmap font, scaled nearest-neighbor to
//!   the requested height. Always available, but glyph coverage is limited;
//!   characters without a glyph render as a box outline.
//! - **TTF**: any TrueType/OpenType file rendered with ab_glyph, anti-aliased.
//!   Use this for full Cyrillic coverage.
//!
//! [`FontSource::System`] probes a short list of well-known system font paths
//! and falls back to the built-in font when none exists.

use ab_glyph::{Font, FontVec, ScaleFont};
use serde::{Deserialize, Serialize};
use spleen_font::{FONT_12X24, PSF2Font};
use std::path::{Path, PathBuf};

use crate::error::LabelError;

const SPLEEN_WIDTH: usize = 12;
const SPLEEN_HEIGHT: usize = 24;

/// Fonts probed by [`FontSource::System`], in order.
const SYSTEM_FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/Library/Fonts/Arial Bold.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
];

/// Where label text glyphs come from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "path")]
pub enum FontSource {
    /// Spleen bitmap font compiled into the binary
    Builtin,
    /// First existing well-known system font, else built-in
    #[default]
    System,
    /// Explicit font file
    File(PathBuf),
}

/// Rendered text as a coverage buffer.
pub struct TextBitmap {
    pub width: usize,
    pub height: usize,
    /// Coverage values: 0.0 = paper, 1.0 = full ink.
    pub data: Vec<f32>,
}

impl TextBitmap {
    #[inline]
    pub fn at(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.width + x]
    }
}

/// A loaded label font.
pub enum LabelFont {
    Builtin,
    Ttf(FontVec),
}

impl LabelFont {
    pub fn load(source: &FontSource) -> Result<Self, LabelError> {
        match source {
            FontSource::Builtin => Ok(LabelFont::Builtin),
            FontSource::File(path) => Self::from_file(path),
            FontSource::System => {
                for candidate in SYSTEM_FONT_PATHS {
                    let path = Path::new(candidate);
                    if path.exists() {
                        match Self::from_file(path) {
                            Ok(font) => {
                                tracing::debug!(font = %path.display(), "using system font");
                                return Ok(font);
                            }
                            Err(e) => tracing::warn!(error = %e, "skipping system font"),
                        }
                    }
                }
                tracing::debug!("no system font found, using built-in bitmap font");
                Ok(LabelFont::Builtin)
            }
        }
    }

    fn from_file(path: &Path) -> Result<Self, LabelError> {
        let bytes = std::fs::read(path).map_err(|e| {
            LabelError::Font(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let font = FontVec::try_from_vec(bytes).map_err(|e| {
            LabelError::Font(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        Ok(LabelFont::Ttf(font))
    }

    /// Render a single line of text at the given pixel height.
    pub fn render(&self, text: &str, pixel_height: f32) -> TextBitmap {
        match self {
            LabelFont::Builtin => render_spleen(text, pixel_height),
            LabelFont::Ttf(font) => render_ttf(font, text, pixel_height),
        }
    }
}

fn render_ttf(font: &FontVec, text: &str, pixel_height: f32) -> TextBitmap {
    let scaled = font.as_scaled(pixel_height);

    let mut glyphs = Vec::new();
    let mut caret_x = 0.0f32;
    for ch in text.chars() {
        let glyph_id = font.glyph_id(ch);
        glyphs.push((glyph_id, caret_x));
        caret_x += scaled.h_advance(glyph_id);
    }

    let width = (caret_x.ceil() as usize).max(1);
    let ascent = scaled.ascent();
    let height = ((ascent - scaled.descent()).ceil() as usize).max(1);

    let mut data = vec![0.0f32; width * height];

    for &(glyph_id, glyph_x) in &glyphs {
        let glyph =
            glyph_id.with_scale_and_position(pixel_height, ab_glyph::point(glyph_x, ascent));

        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            outlined.draw(|px, py, coverage| {
                let x = px as i32 + bounds.min.x as i32;
                let y = py as i32 + bounds.min.y as i32;
                if x >= 0 && x < width as i32 && y >= 0 && y < height as i32 {
                    let idx = y as usize * width + x as usize;
                    data[idx] = (data[idx] + coverage).min(1.0);
                }
            });
        }
    }

    TextBitmap {
        width,
        height,
        data,
    }
}

fn render_spleen(text: &str, pixel_height: f32) -> TextBitmap {
    let chars: Vec<char> = text.chars().collect();
    let src_width = (chars.len() * SPLEEN_WIDTH).max(1);
    let mut src = vec![0u8; src_width * SPLEEN_HEIGHT];

    let mut spleen = PSF2Font::new(FONT_12X24).ok();

    for (i, ch) in chars.iter().enumerate() {
        let mut cell = [0u8; SPLEEN_WIDTH * SPLEEN_HEIGHT];
        let utf8 = ch.to_string();

        let found = match spleen.as_mut() {
            Some(font) => match font.glyph_for_utf8(utf8.as_bytes()) {
                Some(glyph) => {
                    for (row_y, row) in glyph.enumerate() {
                        for (col_x, on) in row.enumerate() {
                            let idx = row_y * SPLEEN_WIDTH + col_x;
                            if idx < cell.len() {
                                cell[idx] = on as u8;
                            }
                        }
                    }
                    true
                }
                None => false,
            },
            None => false,
        };

        if !found && !ch.is_whitespace() {
            draw_box(&mut cell, SPLEEN_WIDTH, SPLEEN_HEIGHT);
        }

        for y in 0..SPLEEN_HEIGHT {
            let dst_row = y * src_width + i * SPLEEN_WIDTH;
            src[dst_row..dst_row + SPLEEN_WIDTH]
                .copy_from_slice(&cell[y * SPLEEN_WIDTH..(y + 1) * SPLEEN_WIDTH]);
        }
    }

    let scale = pixel_height / SPLEEN_HEIGHT as f32;
    let width = ((src_width as f32 * scale).round() as usize).max(1);
    let height = (pixel_height.round() as usize).max(1);
    let mut data = vec![0.0f32; width * height];

    for dy in 0..height {
        let sy = (dy * SPLEEN_HEIGHT / height).min(SPLEEN_HEIGHT - 1);
        for dx in 0..width {
            let sx = (dx * src_width / width).min(src_width - 1);
            if src[sy * src_width + sx] != 0 {
                data[dy * width + dx] = 1.0;
            }
        }
    }

    TextBitmap {
        width,
        height,
        data,
    }
}

/// Draw a box outline for characters the bitmap font lacks.
fn draw_box(glyph: &mut [u8], width: usize, height: usize) {
    for x in 1..width - 1 {
        glyph[2 * width + x] = 1;
        glyph[(height - 3) * width + x] = 1;
    }
    for y in 2..height - 2 {
        glyph[y * width + 1] = 1;
        glyph[y * width + width - 2] = 1;
    }
}
