//! # Visual Label Layout
//!
//! The visual representation of a label: positioned elements in millimetres,
//! measured from the top-left corner. It drives both the on-screen preview
//! and the rasterized document, so it must not contain anything that varies
//! between two renderings of the same [`LabelData`].
//!
//! ## Small (58 × 30 mm)
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │            PRODUCT NAME              │
//! │ 15.5 кг                  Партія: 1   │
//! │              25.10.2023              │
//! │ ║│║║│║│║║│║║│║│║║│║║│║│║║│║║│║│║║│║  │
//! │        20231025-LF-001-15.5          │
//! └──────────────────────────────────────┘
//! ```
//!
//! ## Large (100 × 100 mm)
//!
//! Logo mark and product name header, a two-column field grid (type, batch,
//! weight, date), and a larger barcode.

use serde::Serialize;

use crate::label::LabelData;
use crate::printer::{LabelFormat, LabelSize};

/// Horizontal anchor of a text element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    /// `x` is the left edge
    Left,
    /// `x` is the centre
    Center,
    /// `x` is the right edge
    Right,
}

/// Text tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Black,
    Gray,
}

impl Tone {
    /// Ink intensity (1.0 = black).
    pub fn ink(&self) -> f32 {
        match self {
            Tone::Black => 1.0,
            Tone::Gray => 0.55,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Element {
    Text {
        text: String,
        x_mm: f32,
        y_mm: f32,
        height_mm: f32,
        align: Align,
        bold: bool,
        tone: Tone,
    },
    /// Code 128 with its human-readable line underneath
    Barcode {
        value: String,
        x_mm: f32,
        y_mm: f32,
        width_mm: f32,
        height_mm: f32,
        text_height_mm: f32,
    },
    /// Leaf-shaped logo mark in a square box
    Logo { x_mm: f32, y_mm: f32, size_mm: f32 },
    /// Horizontal rule
    Rule {
        x_mm: f32,
        y_mm: f32,
        width_mm: f32,
        thickness_mm: f32,
    },
}

/// Complete visual description of one label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelLayout {
    pub size: LabelSize,
    pub width_mm: f32,
    pub height_mm: f32,
    /// Left and right margin text is kept within
    pub margin_mm: f32,
    pub elements: Vec<Element>,
}

impl LabelLayout {
    /// Lay out the label for its selected size.
    pub fn build(data: &LabelData) -> Self {
        let format = LabelFormat::for_size(data.size());
        let elements = match data.size() {
            LabelSize::Small => small_elements(data, format),
            LabelSize::Large => large_elements(data, format),
        };

        Self {
            size: data.size(),
            width_mm: format.width_mm as f32,
            height_mm: format.height_mm as f32,
            margin_mm: match data.size() {
                LabelSize::Small => 1.5,
                LabelSize::Large => 6.0,
            },
            elements,
        }
    }

    /// All text strings on the label, in layout order.
    pub fn texts(&self) -> Vec<&str> {
        self.elements
            .iter()
            .filter_map(|e| match e {
                Element::Text { text, .. } => Some(text.as_str()),
                Element::Barcode { value, .. } => Some(value.as_str()),
                _ => None,
            })
            .collect()
    }
}

fn text(text: impl Into<String>, x_mm: f32, y_mm: f32, height_mm: f32, align: Align) -> Element {
    Element::Text {
        text: text.into(),
        x_mm,
        y_mm,
        height_mm,
        align,
        bold: false,
        tone: Tone::Black,
    }
}

fn bold(element: Element) -> Element {
    match element {
        Element::Text {
            text,
            x_mm,
            y_mm,
            height_mm,
            align,
            tone,
            ..
        } => Element::Text {
            text,
            x_mm,
            y_mm,
            height_mm,
            align,
            bold: true,
            tone,
        },
        other => other,
    }
}

fn gray(element: Element) -> Element {
    match element {
        Element::Text {
            text,
            x_mm,
            y_mm,
            height_mm,
            align,
            bold,
            ..
        } => Element::Text {
            text,
            x_mm,
            y_mm,
            height_mm,
            align,
            bold,
            tone: Tone::Gray,
        },
        other => other,
    }
}

fn weight_text(data: &LabelData) -> String {
    format!("{} кг", data.weight().display_value())
}

fn small_elements(data: &LabelData, format: &LabelFormat) -> Vec<Element> {
    let width = format.width_mm as f32;
    let center = width / 2.0;

    vec![
        bold(text(
            data.product().display_name(),
            center,
            1.2,
            3.6,
            Align::Center,
        )),
        bold(text(weight_text(data), 2.0, 6.4, 3.2, Align::Left)),
        bold(text(
            format!("Партія: {}", data.sequence()),
            width - 2.0,
            6.4,
            3.2,
            Align::Right,
        )),
        text(data.display_date(), center, 10.6, 2.4, Align::Center),
        Element::Barcode {
            value: data.barcode_value(),
            x_mm: 1.5,
            y_mm: 14.0,
            width_mm: width - 3.0,
            height_mm: 11.0,
            text_height_mm: 2.4,
        },
    ]
}

fn large_elements(data: &LabelData, format: &LabelFormat) -> Vec<Element> {
    let width = format.width_mm as f32;
    let name = data.product().display_name();
    let left = 8.0;
    let right = 54.0;

    vec![
        Element::Logo {
            x_mm: left,
            y_mm: 6.0,
            size_mm: 14.0,
        },
        bold(text(name, 26.0, 9.5, 7.0, Align::Left)),
        Element::Rule {
            x_mm: left,
            y_mm: 24.0,
            width_mm: width - 2.0 * left,
            thickness_mm: 0.6,
        },
        gray(text("Тип продукції", left, 30.0, 3.2, Align::Left)),
        bold(text(name, left, 34.5, 5.0, Align::Left)),
        gray(text("Вага (Нетто)", right, 30.0, 3.2, Align::Left)),
        bold(text(weight_text(data), right, 34.5, 5.0, Align::Left)),
        gray(text("Партія №", left, 46.0, 3.2, Align::Left)),
        bold(text(data.sequence().to_string(), left, 50.5, 5.0, Align::Left)),
        gray(text("Дата виготовлення", right, 46.0, 3.2, Align::Left)),
        bold(text(data.display_date(), right, 50.5, 5.0, Align::Left)),
        Element::Barcode {
            value: data.barcode_value(),
            x_mm: left,
            y_mm: 64.0,
            width_mm: width - 2.0 * left,
            height_mm: 22.0,
            text_height_mm: 4.5,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::{ProductCode, Weight};
    use chrono::NaiveDate;

    fn label(size: LabelSize, weight: &str) -> LabelData {
        LabelData::new(
            NaiveDate::from_ymd_opt(2023, 10, 25).unwrap(),
            ProductCode::CS,
            42,
            Weight::parse(weight).unwrap(),
            size,
        )
        .unwrap()
    }

    #[test]
    fn test_small_fields() {
        let layout = LabelLayout::build(&label(LabelSize::Small, "15.5"));
        assert_eq!(layout.width_mm, 58.0);
        assert_eq!(layout.height_mm, 30.0);
        assert_eq!(
            layout.texts(),
            vec![
                "Костра калібрована",
                "15.5 кг",
                "Партія: 42",
                "25.10.2023",
                "20231025-CS-042-15.5",
            ]
        );
    }

    #[test]
    fn test_unset_weight_shows_placeholder() {
        let layout = LabelLayout::build(&label(LabelSize::Large, ""));
        assert!(layout.texts().contains(&"0.00 кг"));
        assert!(layout.texts().contains(&"20231025-CS-042-0"));
    }

    #[test]
    fn test_large_has_logo_and_grid() {
        let layout = LabelLayout::build(&label(LabelSize::Large, "3"));
        assert!(layout.elements.iter().any(|e| matches!(e, Element::Logo { .. })));
        for caption in ["Тип продукції", "Вага (Нетто)", "Партія №", "Дата виготовлення"] {
            assert!(layout.texts().contains(&caption));
        }
    }

    #[test]
    fn test_elements_fit_the_label() {
        for size in LabelSize::ALL {
            let layout = LabelLayout::build(&label(size, "99.99"));
            for element in &layout.elements {
                let bottom = match element {
                    Element::Text { y_mm, height_mm, .. } => y_mm + height_mm,
                    Element::Barcode {
                        y_mm,
                        height_mm,
                        text_height_mm,
                        ..
                    } => y_mm + height_mm + text_height_mm,
                    Element::Logo { y_mm, size_mm, .. } => y_mm + size_mm,
                    Element::Rule {
                        y_mm, thickness_mm, ..
                    } => y_mm + thickness_mm,
                };
                assert!(bottom <= layout.height_mm, "{:?} overflows", element);
            }
        }
    }

    #[test]
    fn test_layout_is_deterministic() {
        let data = label(LabelSize::Small, "1.25");
        assert_eq!(LabelLayout::build(&data), LabelLayout::build(&data));
    }
}
