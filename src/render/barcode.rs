//! Barcode encoding for the visual label.
//!
//! Uses the barcoders crate for Code 128, the same symbology the markup
//! layouts request with `^BC`.

use barcoders::sym::code128::Code128;

use crate::error::LabelError;

/// Encode data as Code 128 modules.
/// Returns a Vec<bool> where true = bar (black), false = space (white).
pub fn encode_code128(data: &str) -> Result<Vec<bool>, LabelError> {
    // Character Set B (Ɓ) covers digits, letters and the dash/dot separators
    // used in barcode payloads.
    let prefixed_data = format!("\u{0181}{}", data);

    let barcode = Code128::new(&prefixed_data)
        .map_err(|e| LabelError::Raster(format!("Cannot encode barcode {:?}: {}", data, e)))?;

    Ok(barcode.encode().into_iter().map(|module| module == 1).collect())
}
