//! # Label Markup Encoding
//!
//! Maps a [`LabelData`] to a ZPL document for direct printing. The dot grid
//! assumes 8 dots/mm (203 dpi).
//!
//! ## Compact Layout (58 × 30 mm, 464 × 240 dots)
//!
//! ```text
//! (10,10)   product name            font 25
//! (10,45)   {weight}kg              font 20
//! (160,45)  Парт: {n}               font 20
//! (260,45)  {date}                  font 20
//! (10,80)   Code 128, 60 dots high, module 2
//! ```
//!
//! ## Spacious Layout (100 × 100 mm, 800 × 800 dots)
//!
//! ```text
//! (30,30)   product name            font 60
//! (30,120)  Тип: {name}    (400,120) Вага: {weight} кг
//! (30,200)  Партія: {n}    (400,200) Дата: {date}
//! (50,350)  Code 128, 200 dots high, module 3
//! ```

use super::zpl::ZplDocument;
use crate::label::LabelData;
use crate::printer::LabelSize;

/// File extension of the downloadable markup artifact.
pub const ARTIFACT_EXTENSION: &str = "zpl";

/// Encode a label as a ZPL document.
pub fn encode(data: &LabelData) -> String {
    match data.size() {
        LabelSize::Small => compact(data),
        LabelSize::Large => spacious(data),
    }
}

/// Download file name for the markup artifact (`label-{article}.zpl`).
pub fn artifact_name(data: &LabelData) -> String {
    format!("label-{}.{}", data.article(), ARTIFACT_EXTENSION)
}

fn compact(data: &LabelData) -> String {
    let format = data.size().format();
    let name = data.product().display_name();

    ZplDocument::new(format.width_dots(), format.height_dots())
        .text(10, 10, 25, name)
        .text(10, 45, 20, &format!("{}kg", data.weight().markup_value()))
        .text(160, 45, 20, &format!("Парт: {}", data.sequence()))
        .text(260, 45, 20, &data.display_date())
        .code128(10, 80, 2, 60, &data.barcode_value())
        .finish()
}

fn spacious(data: &LabelData) -> String {
    let format = data.size().format();
    let name = data.product().display_name();

    ZplDocument::new(format.width_dots(), format.height_dots())
        .text(30, 30, 60, name)
        .text(30, 120, 40, &format!("Тип: {}", name))
        .text(
            400,
            120,
            40,
            &format!("Вага: {} кг", data.weight().markup_value()),
        )
        .text(30, 200, 40, &format!("Партія: {}", data.sequence()))
        .text(400, 200, 40, &format!("Дата: {}", data.display_date()))
        .code128(50, 350, 3, 200, &data.barcode_value())
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::{ProductCode, Weight};
    use chrono::NaiveDate;

    fn label(size: LabelSize, weight: &str) -> LabelData {
        LabelData::new(
            NaiveDate::from_ymd_opt(2023, 10, 25).unwrap(),
            ProductCode::LF,
            1,
            Weight::parse(weight).unwrap(),
            size,
        )
        .unwrap()
    }

    #[test]
    fn test_sentinels() {
        for size in LabelSize::ALL {
            let zpl = encode(&label(size, "15.5"));
            assert!(zpl.starts_with("^XA"));
            assert!(zpl.ends_with("^XZ"));
            assert_eq!(zpl, zpl.trim());
        }
    }

    #[test]
    fn test_barcode_payload_appears_once() {
        let data = label(LabelSize::Small, "15.5");
        let zpl = encode(&data);
        assert_eq!(zpl.matches(&data.barcode_value()).count(), 1);
        assert!(zpl.contains("^FD20231025-LF-001-15.5^FS"));
    }

    #[test]
    fn test_canvas_directives() {
        let small = encode(&label(LabelSize::Small, "1"));
        assert!(small.contains("^PW464\n^LL240"));
        let large = encode(&label(LabelSize::Large, "1"));
        assert!(large.contains("^PW800\n^LL800"));
        assert!(large.contains("^BY3,3,200\n^BCN,200,Y,N,N"));
    }

    #[test]
    fn test_unset_weight_renders_zero() {
        let small = encode(&label(LabelSize::Small, ""));
        assert!(small.contains("^FD0kg^FS"));
        assert!(small.contains("-001-0^FS"));
        let large = encode(&label(LabelSize::Large, ""));
        assert!(large.contains("^FDВага: 0 кг^FS"));
    }

    #[test]
    fn test_deterministic() {
        let data = label(LabelSize::Large, "20.25");
        assert_eq!(encode(&data), encode(&data.clone()));
    }

    #[test]
    fn test_artifact_name() {
        assert_eq!(
            artifact_name(&label(LabelSize::Small, "")),
            "label-LF-20231025-001.zpl"
        );
    }
}
