//! # Peripheral Session
//!
//! Stateful connection to one wireless printer.
//!
//! ## States
//!
//! ```text
//!              connect()                 open_channel ok
//! Disconnected ─────────► Connecting ─────────────────► Connected
//!      ▲                      │ any failure                 │
//!      └──────────────────────┘◄────────── disconnect() ────┘
//! ```
//!
//! ## Guarantees
//!
//! - One operation at a time: `connect`/`print` take the operation slot with
//!   `try_lock` and fail with [`SessionError::Busy`] if it is held.
//! - A failed connect closes whatever it opened and ends Disconnected.
//! - Payloads go out in [`CHUNK_SIZE`] pieces, each write awaited before the
//!   next is issued.
//! - A failed write leaves the session Connected.
//! - A link the printer dropped on its own is released by the next
//!   `connect`, so reconnecting needs no explicit `disconnect`.
//! - `disconnect` cancels a connect that is still running, then waits for
//!   any in-flight print to finish.

use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard, Notify, broadcast, watch};

use super::adapter::{
    DEFAULT_DEVICE_NAME, DiscoveryRequest, PeripheralAdapter, WRITE_CHARACTERISTIC_UUID,
};
use crate::error::SessionError;

/// Maximum bytes per characteristic write.
pub const CHUNK_SIZE: usize = 512;

const EVENT_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SessionStatus {
    pub state: SessionState,
    pub device_name: Option<String>,
}

/// Published on every transition a subscriber may care about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Connected { device_name: String },
    Disconnected,
    ConnectFailed { reason: String },
}

/// Opt-in limits. `None` waits as long as the platform does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionConfig {
    pub connect_timeout: Option<Duration>,
    pub write_timeout: Option<Duration>,
}

struct Slot<A: PeripheralAdapter> {
    device: Option<A::Device>,
    channel: Option<A::Channel>,
}

pub struct PeripheralSession<A: PeripheralAdapter> {
    adapter: A,
    config: SessionConfig,
    slot: Mutex<Slot<A>>,
    cancel: Notify,
    status: watch::Sender<SessionStatus>,
    events: broadcast::Sender<SessionEvent>,
}

impl<A: PeripheralAdapter> PeripheralSession<A> {
    pub fn new(adapter: A) -> Self {
        Self::with_config(adapter, SessionConfig::default())
    }

    pub fn with_config(adapter: A, config: SessionConfig) -> Self {
        let (status, _) = watch::channel(SessionStatus::default());
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            adapter,
            config,
            slot: Mutex::new(Slot {
                device: None,
                channel: None,
            }),
            cancel: Notify::new(),
            status,
            events,
        }
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn config(&self) -> SessionConfig {
        self.config
    }

    pub fn status(&self) -> SessionStatus {
        self.status.borrow().clone()
    }

    pub fn state(&self) -> SessionState {
        self.status.borrow().state
    }

    pub fn device_name(&self) -> Option<String> {
        self.status.borrow().device_name.clone()
    }

    /// Event stream. Only events sent after subscribing are received.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn watch_status(&self) -> watch::Receiver<SessionStatus> {
        self.status.subscribe()
    }

    /// Discover, select and open the best matching printer.
    ///
    /// Returns the connected device's name. A stale link the printer
    /// dropped is released first; a live one gives
    /// [`SessionError::AlreadyConnected`].
    pub async fn connect(&self, preferred_name: Option<&str>) -> Result<String, SessionError> {
        let mut slot = self.slot.try_lock().map_err(|_| SessionError::Busy)?;
        let cancelled = self.cancel.notified();

        if slot.channel.is_some() {
            let link_up = match slot.device.as_ref() {
                Some(device) => self.adapter.is_link_up(device).await,
                None => false,
            };
            if link_up {
                return Err(SessionError::AlreadyConnected);
            }
            tracing::warn!("printer link dropped, reconnecting");
            self.release(&mut slot).await;
            self.set_status(SessionState::Disconnected, None);
            self.publish(SessionEvent::Disconnected);
        }

        self.set_status(SessionState::Connecting, None);
        let request = DiscoveryRequest::printer(preferred_name);
        tracing::info!(preferred = ?request.preferred_name, "connecting to printer");

        let attempt = with_limit(
            self.config.connect_timeout,
            self.establish(&mut slot, &request),
        );
        let result = tokio::select! {
            result = attempt => result,
            _ = cancelled => Err(SessionError::Cancelled),
        };

        match result {
            Ok(name) => {
                self.set_status(SessionState::Connected, Some(name.clone()));
                self.publish(SessionEvent::Connected {
                    device_name: name.clone(),
                });
                tracing::info!(device = %name, "printer connected");
                Ok(name)
            }
            Err(e) => {
                self.release(&mut slot).await;
                self.set_status(SessionState::Disconnected, None);
                self.publish(SessionEvent::ConnectFailed {
                    reason: e.to_string(),
                });
                tracing::warn!(error = %e, "printer connection failed");
                Err(e)
            }
        }
    }

    async fn establish(
        &self,
        slot: &mut MutexGuard<'_, Slot<A>>,
        request: &DiscoveryRequest,
    ) -> Result<String, SessionError> {
        self.adapter.probe().await?;

        let candidates = self.adapter.discover(request).await?;
        tracing::debug!(seen = candidates.len(), "discovery finished");

        let candidate = request.select(candidates).ok_or(SessionError::NoDevice)?;
        let name = candidate
            .name
            .clone()
            .unwrap_or_else(|| DEFAULT_DEVICE_NAME.to_string());
        tracing::debug!(device = %name, "selected printer");

        slot.device = Some(candidate.device.clone());
        let channel = self
            .adapter
            .open_channel(&candidate.device, request.service, WRITE_CHARACTERISTIC_UUID)
            .await?;
        slot.channel = Some(channel);

        Ok(name)
    }

    /// Send a markup payload. Returns the number of chunks written.
    pub async fn print(&self, payload: &str) -> Result<usize, SessionError> {
        let mut slot = self.slot.try_lock().map_err(|_| SessionError::Busy)?;

        let link_up = match (&slot.device, &slot.channel) {
            (Some(device), Some(_)) if self.state() == SessionState::Connected => {
                self.adapter.is_link_up(device).await
            }
            _ => return Err(SessionError::NotConnected),
        };
        if !link_up {
            tracing::warn!("printer link dropped");
            self.release(&mut slot).await;
            self.set_status(SessionState::Disconnected, None);
            self.publish(SessionEvent::Disconnected);
            return Err(SessionError::NotConnected);
        }
        let Some(channel) = slot.channel.as_ref() else {
            return Err(SessionError::NotConnected);
        };

        let bytes = payload.as_bytes();
        let total = bytes.len().div_ceil(CHUNK_SIZE);
        for (index, chunk) in bytes.chunks(CHUNK_SIZE).enumerate() {
            with_limit(self.config.write_timeout, self.adapter.write(channel, chunk))
                .await
                .map_err(|e| SessionError::Write {
                    chunk: index,
                    reason: e.to_string(),
                })?;
            tracing::debug!(chunk = index + 1, total, len = chunk.len(), "chunk written");
        }

        tracing::info!(bytes = bytes.len(), chunks = total, "payload transmitted");
        Ok(total)
    }

    /// Close the link if one is held. Safe to call in any state.
    ///
    /// A running connect is cancelled and ends with
    /// [`SessionError::Cancelled`]. A running print is waited for.
    pub async fn disconnect(&self) {
        self.cancel.notify_waiters();
        let mut slot = self.slot.lock().await;
        let released = self.release(&mut slot).await;
        self.set_status(SessionState::Disconnected, None);
        if released {
            self.publish(SessionEvent::Disconnected);
            tracing::info!("printer disconnected");
        }
    }

    /// Connected, holding a channel, and the platform reports the link up.
    ///
    /// While another operation holds the slot this answers from the
    /// published state alone.
    pub async fn is_connected(&self) -> bool {
        let connected = self.state() == SessionState::Connected;
        match self.slot.try_lock() {
            Ok(slot) => match (&slot.device, &slot.channel) {
                (Some(device), Some(_)) if connected => self.adapter.is_link_up(device).await,
                _ => false,
            },
            Err(_) => connected,
        }
    }

    /// Drop the channel and close the device. Returns whether anything was held.
    async fn release(&self, slot: &mut MutexGuard<'_, Slot<A>>) -> bool {
        let held = slot.device.is_some() || slot.channel.is_some();
        slot.channel = None;
        if let Some(device) = slot.device.take()
            && self.adapter.is_link_up(&device).await
            && let Err(e) = self.adapter.close(&device).await
        {
            tracing::warn!(error = %e, "failed to close printer link");
        }
        held
    }

    fn set_status(&self, state: SessionState, device_name: Option<String>) {
        self.status.send_replace(SessionStatus { state, device_name });
    }

    fn publish(&self, event: SessionEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

async fn with_limit<T>(
    limit: Option<Duration>,
    operation: impl Future<Output = Result<T, SessionError>>,
) -> Result<T, SessionError> {
    match limit {
        Some(limit) => tokio::time::timeout(limit, operation)
            .await
            .unwrap_or(Err(SessionError::Timeout)),
        None => operation.await,
    }
}
