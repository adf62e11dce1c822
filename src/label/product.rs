//! Product catalog.
//!
//! The catalog is closed: every code has a display name, and codes coming
//! from outside the crate (CLI flags, HTTP bodies, settings) are parsed with
//! [`ProductCode::from_str`], which rejects anything unknown.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::LabelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ProductCode {
    /// Long fibre
    #[default]
    LF,
    /// Short fibre
    SF,
    /// Calibrated shives
    CS,
    /// Uncalibrated shives
    NS,
    /// Shive dust
    DS,
}

impl ProductCode {
    pub const ALL: [ProductCode; 5] = [
        ProductCode::LF,
        ProductCode::SF,
        ProductCode::CS,
        ProductCode::NS,
        ProductCode::DS,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            ProductCode::LF => "LF",
            ProductCode::SF => "SF",
            ProductCode::CS => "CS",
            ProductCode::NS => "NS",
            ProductCode::DS => "DS",
        }
    }

    /// Product name printed on the label.
    pub fn display_name(&self) -> &'static str {
        match self {
            ProductCode::LF => "Довге волокно",
            ProductCode::SF => "Коротке волокно",
            ProductCode::CS => "Костра калібрована",
            ProductCode::NS => "Костра некалібрована",
            ProductCode::DS => "Пил костри",
        }
    }
}

impl fmt::Display for ProductCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for ProductCode {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ProductCode::ALL
            .into_iter()
            .find(|p| p.code().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| LabelError::UnknownProduct(wanted.to_string()))
    }
}
