//! Keypad weight buffer.
//!
//! The weight is kept exactly as the operator typed it. Three renderings are
//! derived from the buffer:
//!
//! | Use | Empty buffer | `"15.50"` |
//! |-----|--------------|-----------|
//! | Barcode payload | `0` | `15.50` |
//! | Printer markup | `0` | `15.5` |
//! | Visual preview | `0.00` | `15.50` |

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::LabelError;

/// Maximum number of digits after the decimal point.
pub const MAX_FRACTION_DIGITS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Weight(String);

impl TryFrom<String> for Weight {
    type Error = LabelError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        Weight::parse(&text)
    }
}

impl From<Weight> for String {
    fn from(weight: Weight) -> Self {
        weight.0
    }
}

impl Weight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse typed text by replaying it through the keypad rules.
    ///
    /// Rejects text the keypad would not produce (letters, a second dot,
    /// a third fractional digit).
    pub fn parse(text: &str) -> Result<Self, LabelError> {
        let mut weight = Weight::new();
        for key in text.trim().chars() {
            if !weight.press(key) {
                return Err(LabelError::InvalidWeight(text.to_string()));
            }
        }
        Ok(weight)
    }

    /// Apply one keypad key. Returns `false` if the key was ignored.
    pub fn press(&mut self, key: char) -> bool {
        match key {
            '.' => {
                if self.0.contains('.') {
                    return false;
                }
                if self.0.is_empty() {
                    self.0.push_str("0.");
                } else {
                    self.0.push('.');
                }
                true
            }
            '0'..='9' => {
                if let Some((_, fraction)) = self.0.split_once('.')
                    && fraction.len() >= MAX_FRACTION_DIGITS
                {
                    return false;
                }
                self.0.push(key);
                true
            }
            _ => false,
        }
    }

    /// Remove the last typed character.
    pub fn delete(&mut self) {
        self.0.pop();
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Weight segment of the barcode payload.
    pub fn barcode_segment(&self) -> &str {
        if self.0.is_empty() { "0" } else { &self.0 }
    }

    /// Numeric form for printer markup: no leading zeros, no trailing
    /// fractional zeros, `0` when empty.
    pub fn markup_value(&self) -> String {
        let (int_part, fraction) = match self.0.split_once('.') {
            Some((i, f)) => (i, f),
            None => (self.0.as_str(), ""),
        };

        let int_part = int_part.trim_start_matches('0');
        let int_part = if int_part.is_empty() { "0" } else { int_part };
        let fraction = fraction.trim_end_matches('0');

        if fraction.is_empty() {
            int_part.to_string()
        } else {
            format!("{}.{}", int_part, fraction)
        }
    }

    /// Text for the on-screen preview and the rasterized document.
    pub fn display_value(&self) -> &str {
        if self.0.is_empty() { "0.00" } else { &self.0 }
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_value())
    }
}
