//! # Document Output
//!
//! The rasterized-document path: render the visual label, wrap the bitmap in
//! a PDF sized to the physical label, save it, and hand it to the platform.
//!
//! ## Pipeline
//!
//! ```text
//! LabelData → LabelLayout → rasterize (blocking worker) → build_pdf
//!           → label-{article}.pdf → PrintDispatch
//! ```
//!
//! Any failure aborts the pipeline and is returned to the caller; nothing
//! here touches the operator's form state.

pub mod dispatch;
pub mod pdf;

pub use dispatch::PrintDispatch;
pub use pdf::{PdfOptions, build_pdf};

use image::GrayImage;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::LabelError;
use crate::label::LabelData;
use crate::render::{LabelFont, LabelLayout, RasterConfig, rasterize, to_png};
use crate::settings::Settings;

/// Rasterization & document output.
#[derive(Clone)]
pub struct DocumentOutput {
    font: Arc<LabelFont>,
    raster: RasterConfig,
    pdf: PdfOptions,
    dispatch: PrintDispatch,
    output_dir: PathBuf,
}

impl DocumentOutput {
    pub fn new(font: LabelFont, dispatch: PrintDispatch, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            font: Arc::new(font),
            raster: RasterConfig::default(),
            pdf: PdfOptions::default(),
            dispatch,
            output_dir: output_dir.into(),
        }
    }

    /// Build from persisted settings, loading the configured font.
    pub fn from_settings(settings: &Settings) -> Result<Self, LabelError> {
        let font = LabelFont::load(&settings.font)?;
        let mut output = Self::new(font, settings.dispatch.clone(), settings.output_dir());
        output.pdf.auto_print = settings.auto_print;
        Ok(output)
    }

    pub fn with_raster(mut self, raster: RasterConfig) -> Self {
        self.raster = raster;
        self
    }

    pub fn with_pdf_options(mut self, pdf: PdfOptions) -> Self {
        self.pdf = pdf;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn font(&self) -> &LabelFont {
        &self.font
    }

    pub fn raster_config(&self) -> &RasterConfig {
        &self.raster
    }

    /// Rasterize on a blocking worker.
    pub async fn render_bitmap(&self, data: &LabelData) -> Result<GrayImage, LabelError> {
        let layout = LabelLayout::build(data);
        let font = Arc::clone(&self.font);
        let raster = self.raster;

        tokio::task::spawn_blocking(move || rasterize(&layout, &font, &raster))
            .await
            .map_err(|e| LabelError::Raster(format!("Render task failed: {}", e)))?
    }

    /// PNG preview of exactly what [`print`](Self::print) would put on the page.
    pub async fn render_png(&self, data: &LabelData) -> Result<Vec<u8>, LabelError> {
        let image = self.render_bitmap(data).await?;
        to_png(&image)
    }

    /// Render the label into PDF bytes without saving or dispatching.
    pub async fn render_pdf(&self, data: &LabelData) -> Result<Vec<u8>, LabelError> {
        let image = self.render_bitmap(data).await?;

        let mut options = self.pdf.clone();
        if options.title.is_none() {
            options.title = Some(format!("label-{}", data.article()));
        }
        build_pdf(&image, data.size(), &options)
    }

    /// Render, save as `label-{article}.pdf` and dispatch.
    ///
    /// Returns the path of the saved document.
    pub async fn print(&self, data: &LabelData) -> Result<PathBuf, LabelError> {
        let pdf = self.render_pdf(data).await?;

        tokio::fs::create_dir_all(&self.output_dir).await?;
        let path = self.output_dir.join(format!("label-{}.pdf", data.article()));
        tokio::fs::write(&path, &pdf).await?;
        tracing::debug!(path = %path.display(), bytes = pdf.len(), "label document written");

        self.dispatch.submit(&path).await?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::{ProductCode, Weight};
    use crate::printer::LabelSize;
    use chrono::NaiveDate;

    fn label() -> LabelData {
        LabelData::new(
            NaiveDate::from_ymd_opt(2023, 10, 25).unwrap(),
            ProductCode::SF,
            9,
            Weight::parse("4.2").unwrap(),
            LabelSize::Small,
        )
        .unwrap()
    }

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("etiketka-doc-{}", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn test_print_saves_named_pdf() {
        let dir = temp_dir();
        let output = DocumentOutput::new(LabelFont::Builtin, PrintDispatch::SaveOnly, &dir)
            .with_raster(RasterConfig { px_per_mm: 6.0 });

        let path = output.print(&label()).await.unwrap();
        assert_eq!(path, dir.join("label-SF-20231025-009.pdf"));
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_unwritable_output_dir_fails() {
        let blocker = temp_dir();
        std::fs::write(&blocker, b"not a directory").unwrap();

        let output = DocumentOutput::new(
            LabelFont::Builtin,
            PrintDispatch::SaveOnly,
            blocker.join("nested"),
        )
        .with_raster(RasterConfig { px_per_mm: 6.0 });

        assert!(output.print(&label()).await.is_err());
        // Rendering alone does not touch the file system
        let png = output.render_png(&label()).await.unwrap();
        assert_eq!(&png[..4], b"\x89PNG");
        std::fs::remove_file(&blocker).ok();
    }
}
