//! # Etiketka - Product Label Printing
//!
//! Etiketka prints product labels for a hemp processing line. An operator
//! picks a product, types the net weight on a keypad, and gets a label with
//! a Code 128 barcode on either of two paths:
//!
//! - **Document**: the label is rasterized, wrapped in a PDF sized to the
//!   physical label, and handed to the platform print pipeline
//! - **Direct markup**: the label is encoded as ZPL II and streamed to a
//!   Zebra ZD-series printer over Bluetooth Low Energy
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use etiketka::{
//!     coordinator::OutputCoordinator,
//!     document::{DocumentOutput, PrintDispatch},
//!     label::LabelForm,
//!     render::LabelFont,
//!     transport::{BtleAdapter, PeripheralSession},
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let session = Arc::new(PeripheralSession::new(BtleAdapter::new()));
//! let document = DocumentOutput::new(LabelFont::Builtin, PrintDispatch::OpenViewer, "labels");
//! let mut coordinator = OutputCoordinator::new(Arc::clone(&session), document);
//!
//! // Connecting switches the coordinator to direct markup
//! session.connect(None).await?;
//!
//! let mut form = LabelForm::today();
//! for key in "15.5".chars() {
//!     form.press_key(key);
//! }
//! coordinator.print(&mut form, &mut |_: &str| true).await?;
//! assert_eq!(form.sequence(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`label`] | Label data model, operator form, weight keypad |
//! | [`protocol`] | ZPL II builders and the label markup encoder |
//! | [`render`] | Visual layout and rasterization |
//! | [`document`] | PDF output and print dispatch |
//! | [`transport`] | BLE peripheral session and adapters |
//! | [`coordinator`] | Output routing and post-print form advance |
//! | [`printer`] | Label sizes and dot geometry |
//! | [`settings`] | Persisted operator settings |
//! | [`server`] | HTTP API |
//! | [`error`] | Error types |
//!
//! ## Supported Printers
//!
//! Direct markup is tested against Zebra ZD-series printers (203 dpi) that
//! expose the Zebra BLE parser service. Any printer reachable through the
//! platform print dialog works on the document path.

pub mod coordinator;
pub mod document;
pub mod error;
pub mod label;
pub mod printer;
pub mod protocol;
pub mod render;
pub mod server;
pub mod settings;
pub mod transport;

// Re-exports for convenience
pub use coordinator::{OutputCoordinator, PrintMode, PrintOutcome};
pub use error::{LabelError, OutputError, SessionError};
pub use label::{LabelData, LabelForm, ProductCode, Weight};
pub use printer::LabelSize;
pub use transport::PeripheralSession;
