//! # Printer Module
//!
//! Physical label formats and the dot grid shared by the markup encoder and
//! the rasterizer.
//!
//! ## Modules
//!
//! - [`config`]: Label dimensions and unit conversions

pub mod config;

pub use config::{DOTS_PER_MM, LabelFormat, LabelSize, Orientation, POINTS_PER_MM};
