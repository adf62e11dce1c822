//! # Label PDF
//!
//! Wraps a label bitmap in a one-page PDF whose page is exactly the physical
//! label: 58 × 30 mm (landscape) or 100 × 100 mm (portrait).
//!
//! ## Object Graph
//!
//! ```text
//! Catalog ─┬─ Pages ── Page ─┬─ Contents: q W 0 0 H 0 0 cm /Im0 Do Q
//!          │                 └─ Resources: /XObject << /Im0 >>
//!          └─ OpenAction (auto-print only)
//!
//! Im0: DeviceGray, 8 bpc, FlateDecode, fills the MediaBox
//! ```

use flate2::Compression;
use flate2::write::ZlibEncoder;
use image::GrayImage;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use std::io::Write;

use crate::error::LabelError;
use crate::printer::LabelSize;

#[derive(Debug, Clone, Default)]
pub struct PdfOptions {
    /// Ask the viewer to open its print dialog when the file is opened
    pub auto_print: bool,
    /// Document title
    pub title: Option<String>,
}

/// Build the PDF bytes for one label.
pub fn build_pdf(
    image: &GrayImage,
    size: LabelSize,
    options: &PdfOptions,
) -> Result<Vec<u8>, LabelError> {
    let (page_w, page_h) = size.format().size_points();
    let (img_w, img_h) = image.dimensions();
    if img_w == 0 || img_h == 0 {
        return Err(LabelError::Pdf("Empty label bitmap".to_string()));
    }

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let image_stream = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => img_w as i64,
            "Height" => img_h as i64,
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => 8,
            "Filter" => "FlateDecode",
        },
        deflate(image.as_raw())?,
    );
    let image_id = doc.add_object(image_stream);

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    page_w.into(),
                    0.into(),
                    0.into(),
                    page_h.into(),
                    0.into(),
                    0.into(),
                ],
            ),
            Operation::new("Do", vec!["Im0".into()]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_bytes = content
        .encode()
        .map_err(|e| LabelError::Pdf(format!("Content encoding failed: {}", e)))?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, content_bytes));

    let resources_id = doc.add_object(dictionary! {
        "XObject" => dictionary! {
            "Im0" => image_id,
        },
    });

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), page_w.into(), page_h.into()],
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );

    let mut catalog = dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    };
    if options.auto_print {
        let action_id = doc.add_object(dictionary! {
            "Type" => "Action",
            "S" => "JavaScript",
            "JS" => Object::string_literal("print({});"),
        });
        catalog.set("OpenAction", action_id);
    }
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", catalog_id);

    if let Some(title) = &options.title {
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal(title.as_str()),
            "Producer" => Object::string_literal("etiketka"),
        });
        doc.trailer.set("Info", info_id);
    }

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| LabelError::Pdf(format!("Failed to write PDF: {}", e)))?;
    Ok(bytes)
}

fn deflate(data: &[u8]) -> Result<Vec<u8>, LabelError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}
