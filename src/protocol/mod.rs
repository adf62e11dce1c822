//! # Printer Markup
//!
//! ZPL II generation for direct label printers.
//!
//! ## Module Structure
//!
//! - [`zpl`]: Low-level command builders and the document builder
//! - [`markup`]: The two label layouts built on top of them
//!
//! ## Usage Example
//!
//! ```
//! use etiketka::protocol::zpl::ZplDocument;
//!
//! let zpl = ZplDocument::new(464, 240)
//!     .text(10, 10, 25, "Довге волокно")
//!     .code128(10, 80, 2, 60, "20231025-LF-001-15.5")
//!     .finish();
//!
//! assert!(zpl.starts_with("^XA"));
//! assert!(zpl.ends_with("^XZ"));
//! ```

pub mod markup;
pub mod zpl;
