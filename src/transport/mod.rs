//! # Printer Transport Layer
//!
//! Wireless delivery of markup to label printers over BLE.
//!
//! ## Layers
//!
//! - [`session`]: connection state machine, chunked writes, busy guard
//! - [`adapter`]: the platform boundary ([`PeripheralAdapter`]) and discovery
//!   filters
//! - [`btle`]: real hardware via `btleplug`
//! - [`mock`]: scripted adapter for tests and `--simulate`

pub mod adapter;
pub mod btle;
pub mod mock;
pub mod session;

pub use adapter::{
    Candidate, DEFAULT_DEVICE_NAME, DiscoveryRequest, NAME_PREFIXES, PRINTER_SERVICE_UUID,
    PeripheralAdapter, WRITE_CHARACTERISTIC_UUID,
};
pub use btle::BtleAdapter;
pub use mock::MockAdapter;
pub use session::{
    CHUNK_SIZE, PeripheralSession, SessionConfig, SessionEvent, SessionState, SessionStatus,
};
