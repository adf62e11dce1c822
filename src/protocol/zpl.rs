//! # ZPL II Command Builders
//!
//! Text builders for the subset of ZPL II used by the label layouts.
//!
//! ## Document Structure
//!
//! A ZPL document is plain text. Every format opens with `^XA` and closes
//! with `^XZ`; fields are placed with `^FO x,y` and terminated with `^FS`.
//!
//! ```text
//! ^XA            start format
//! ^PW464         print width (dots)
//! ^LL240         label length (dots)
//! ^CI28          UTF-8 field data
//! ^FO10,10       field origin
//! ^A0N,25,25     scalable font 0, normal orientation, height, width
//! ^FDtext^FS     field data
//! ^XZ            end format
//! ```
//!
//! ## Reference
//!
//! Based on the "ZPL II Programming Guide" by Zebra Technologies.

// ============================================================================
// FORMAT CONTROL
// ============================================================================

/// Start of a label format.
pub const START: &str = "^XA";

/// End of a label format.
pub const END: &str = "^XZ";

/// # Print Width (^PW)
#[inline]
pub fn print_width(dots: u32) -> String {
    format!("^PW{}", dots)
}

/// # Label Length (^LL)
#[inline]
pub fn label_length(dots: u32) -> String {
    format!("^LL{}", dots)
}

/// # Change International Font/Encoding (^CI28)
///
/// Selects UTF-8 for field data so Cyrillic product names print as-is.
#[inline]
pub fn utf8() -> &'static str {
    "^CI28"
}

// ============================================================================
// FIELDS
// ============================================================================

/// # Field Origin (^FO)
#[inline]
pub fn field_origin(x: u32, y: u32) -> String {
    format!("^FO{},{}", x, y)
}

/// # Scalable Font (^A0N)
///
/// Font 0 in normal orientation with the given height and width in dots.
#[inline]
pub fn font(height: u32, width: u32) -> String {
    format!("^A0N,{},{}", height, width)
}

/// # Field Data (^FD … ^FS)
///
/// The text is emitted verbatim except for the command prefixes `^` and `~`,
/// which would otherwise start a new command inside the field.
pub fn field_data(text: &str) -> String {
    format!("^FD{}^FS", sanitize(text))
}

/// Replace ZPL command prefixes with spaces.
pub fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| if c == '^' || c == '~' { ' ' } else { c })
        .collect()
}

// ============================================================================
// BARCODES
// ============================================================================

/// # Bar Code Field Defaults (^BY)
///
/// - `module`: narrow bar width in dots
/// - `ratio`: wide-to-narrow ratio
/// - `height`: default bar height in dots
#[inline]
pub fn barcode_defaults(module: u32, ratio: u32, height: u32) -> String {
    format!("^BY{},{},{}", module, ratio, height)
}

/// # Code 128 (^BC)
///
/// Normal orientation, interpretation line printed below the bars, no UCC
/// check digit, automatic subset selection off.
#[inline]
pub fn code128(height: u32) -> String {
    format!("^BCN,{},Y,N,N", height)
}

// ============================================================================
// DOCUMENT BUILDER
// ============================================================================

/// Collects command blocks and joins them into a document.
///
/// Commands inside a block are separated by newlines; blocks are separated by
/// a blank line.
#[derive(Debug, Default)]
pub struct ZplDocument {
    blocks: Vec<Vec<String>>,
}

impl ZplDocument {
    /// Open a format sized to the given canvas.
    pub fn new(width_dots: u32, height_dots: u32) -> Self {
        Self {
            blocks: vec![vec![
                START.to_string(),
                print_width(width_dots),
                label_length(height_dots),
                utf8().to_string(),
            ]],
        }
    }

    /// Add a text field.
    pub fn text(mut self, x: u32, y: u32, font_size: u32, text: &str) -> Self {
        self.blocks.push(vec![
            field_origin(x, y),
            font(font_size, font_size),
            field_data(text),
        ]);
        self
    }

    /// Add a Code 128 barcode with its interpretation line.
    pub fn code128(mut self, x: u32, y: u32, module: u32, height: u32, data: &str) -> Self {
        self.blocks.push(vec![
            field_origin(x, y),
            barcode_defaults(module, 3, height),
            code128(height),
            field_data(data),
        ]);
        self
    }

    /// Close the format and render the text.
    pub fn finish(mut self) -> String {
        self.blocks.push(vec![END.to_string()]);
        self.blocks
            .iter()
            .map(|block| block.join("\n"))
            .collect::<Vec<_>>()
            .join("\n\n")
            .trim()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_field_commands() {
        assert_eq!(field_origin(10, 45), "^FO10,45");
        assert_eq!(font(20, 20), "^A0N,20,20");
        assert_eq!(field_data("abc"), "^FDabc^FS");
        assert_eq!(barcode_defaults(2, 3, 60), "^BY2,3,60");
        assert_eq!(code128(60), "^BCN,60,Y,N,N");
    }

    #[test]
    fn test_sanitize_command_prefixes() {
        assert_eq!(field_data("a^XZb~JA"), "^FDa XZb JA^FS");
        assert_eq!(sanitize("Партія: 7"), "Партія: 7");
    }

    #[test]
    fn test_document_layout() {
        let zpl = ZplDocument::new(464, 240).text(10, 10, 25, "Hi").finish();
        assert_eq!(
            zpl,
            "^XA\n^PW464\n^LL240\n^CI28\n\n^FO10,10\n^A0N,25,25\n^FDHi^FS\n\n^XZ"
        );
    }

    #[test]
    fn test_empty_document() {
        let zpl = ZplDocument::new(800, 800).finish();
        assert!(zpl.starts_with(START));
        assert!(zpl.ends_with(END));
    }
}
