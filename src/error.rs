//! # Error Types
//!
//! This module defines error types used throughout the etiketka library.
//!
//! | Type | Raised by |
//! |------|-----------|
//! | [`LabelError`] | Label model, rendering, PDF output, settings |
//! | [`SessionError`] | Peripheral session and BLE adapters |
//! | [`OutputError`] | Output coordinator (wraps the two above) |

use thiserror::Error;

/// Main error type for label building and document output
#[derive(Debug, Error)]
pub enum LabelError {
    /// Product code outside the closed catalog
    #[error("Unknown product code: {0}")]
    UnknownProduct(String),

    /// Manual sequence entry that is not a positive integer
    #[error("Invalid sequence number: {0:?}")]
    InvalidSequence(String),

    /// Weight text that the keypad would not have produced
    #[error("Invalid weight: {0:?}")]
    InvalidWeight(String),

    /// Unknown label size name
    #[error("Unknown label size: {0}")]
    UnknownSize(String),

    /// Bitmap capture failed
    #[error("Raster error: {0}")]
    Raster(String),

    /// Font loading failed
    #[error("Font error: {0}")]
    Font(String),

    /// PDF encoding failed
    #[error("PDF error: {0}")]
    Pdf(String),

    /// Handing the document to the platform print pipeline failed
    #[error("Print dispatch error: {0}")]
    Dispatch(String),

    /// Settings file could not be parsed or written
    #[error("Settings error: {0}")]
    Settings(String),

    /// HTTP server could not start or stopped with an error
    #[error("Server error: {0}")]
    Server(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the peripheral session state machine and its adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The platform has no usable wireless capability
    #[error("Bluetooth is not available: {0}")]
    Unsupported(String),

    /// Discovery finished without a matching device
    #[error("No matching printer was found")]
    NoDevice,

    /// The printer service is missing on the selected device
    #[error("Printer service {0} not found on device")]
    ServiceNotFound(String),

    /// The writable characteristic is missing on the printer service
    #[error("Write characteristic {0} not found on device")]
    CharacteristicNotFound(String),

    /// Low-level link failure (connect, scan, GATT)
    #[error("Link error: {0}")]
    Link(String),

    /// `connect()` called while a session is already open
    #[error("Printer is already connected")]
    AlreadyConnected,

    /// `print()` called without an open session
    #[error("Printer is not connected")]
    NotConnected,

    /// Another session operation is still in flight
    #[error("Another printer operation is in progress")]
    Busy,

    /// Caller-supplied timeout elapsed
    #[error("Printer operation timed out")]
    Timeout,

    /// `disconnect()` was called while the connect was still running
    #[error("Connection attempt was cancelled")]
    Cancelled,

    /// A chunk write failed mid-stream
    #[error("Write failed at chunk {chunk}: {reason}")]
    Write { chunk: usize, reason: String },
}

/// Errors surfaced by the output coordinator.
#[derive(Debug, Error)]
pub enum OutputError {
    /// Rasterization or document output failed
    #[error("Document output failed: {0}")]
    Document(#[source] LabelError),

    /// Wireless transmission failed
    #[error("Wireless transmission failed: {0}")]
    Transport(#[source] SessionError),

    /// Writing the markup download failed
    #[error("Saving markup file failed: {0}")]
    Artifact(#[source] std::io::Error),
}

impl OutputError {
    /// Operator-facing message shown by the UI layers.
    pub fn operator_message(&self) -> &'static str {
        match self {
            OutputError::Document(_) => "Помилка при створенні PDF файлу.",
            OutputError::Transport(_) => "Помилка друку через Bluetooth. Перевірте з'єднання.",
            OutputError::Artifact(_) => "Не вдалося зберегти ZPL файл.",
        }
    }
}

impl SessionError {
    /// Operator-facing message for failed connection attempts.
    pub fn operator_message(&self) -> &'static str {
        match self {
            SessionError::Unsupported(_) => {
                "Bluetooth недоступний на цьому пристрої."
            }
            SessionError::Busy => "Зачекайте завершення попередньої операції.",
            SessionError::AlreadyConnected => "Принтер вже підключено.",
            SessionError::Cancelled => "Підключення скасовано.",
            _ => "Помилка підключення. Перевірте, чи принтер увімкнено та чи це модель серії ZD.",
        }
    }
}
