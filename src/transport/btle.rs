//! # BLE Adapter
//!
//! [`PeripheralAdapter`] over the host Bluetooth stack via `btleplug`
//! (BlueZ on Linux, CoreBluetooth on macOS, WinRT on Windows).
//!
//! ## Discovery
//!
//! A scan runs for [`DiscoveryRequest::scan_duration`] with no platform-side
//! filter; every peripheral seen is returned with its advertised name and
//! services and the session does the ranking. Devices that only expose the
//! printer service after connecting therefore still show up by name.
//!
//! ## Writes
//!
//! Writes use `WriteType::WithResponse`, so each chunk is acknowledged by the
//! printer's GATT server before the next one is sent.

use async_trait::async_trait;
use btleplug::api::{
    Central, Characteristic, Manager as _, Peripheral as _, ScanFilter, WriteType,
};
use btleplug::platform::{Adapter, Manager, Peripheral};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::adapter::{Candidate, DiscoveryRequest, PeripheralAdapter};
use crate::error::SessionError;

/// Resolved write endpoint.
pub struct BtleChannel {
    peripheral: Peripheral,
    characteristic: Characteristic,
}

#[derive(Default)]
pub struct BtleAdapter {
    central: Mutex<Option<Adapter>>,
}

impl BtleAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// First host adapter, looked up once.
    async fn central(&self) -> Result<Adapter, SessionError> {
        let mut cached = self.central.lock().await;
        if let Some(adapter) = cached.as_ref() {
            return Ok(adapter.clone());
        }

        let manager = Manager::new()
            .await
            .map_err(|e| SessionError::Unsupported(format!("Bluetooth manager: {}", e)))?;
        let adapter = manager
            .adapters()
            .await
            .map_err(|e| SessionError::Unsupported(format!("Listing adapters: {}", e)))?
            .into_iter()
            .next()
            .ok_or_else(|| SessionError::Unsupported("No Bluetooth adapter found".to_string()))?;

        if let Ok(info) = adapter.adapter_info().await {
            tracing::debug!(adapter = %info, "using Bluetooth adapter");
        }
        *cached = Some(adapter.clone());
        Ok(adapter)
    }
}

fn link_error(context: &str, e: btleplug::Error) -> SessionError {
    SessionError::Link(format!("{}: {}", context, e))
}

#[async_trait]
impl PeripheralAdapter for BtleAdapter {
    type Device = Peripheral;
    type Channel = BtleChannel;

    async fn probe(&self) -> Result<(), SessionError> {
        self.central().await.map(|_| ())
    }

    async fn discover(
        &self,
        request: &DiscoveryRequest,
    ) -> Result<Vec<Candidate<Peripheral>>, SessionError> {
        let central = self.central().await?;

        central
            .start_scan(ScanFilter::default())
            .await
            .map_err(|e| link_error("Starting scan", e))?;
        tokio::time::sleep(request.scan_duration).await;

        let peripherals = central.peripherals().await;
        if let Err(e) = central.stop_scan().await {
            tracing::warn!(error = %e, "failed to stop scan");
        }
        let peripherals = peripherals.map_err(|e| link_error("Listing peripherals", e))?;

        let mut candidates = Vec::with_capacity(peripherals.len());
        for peripheral in peripherals {
            let properties = peripheral
                .properties()
                .await
                .map_err(|e| link_error("Reading advertisement", e))?;
            let (name, services) = match properties {
                Some(p) => (p.local_name, p.services),
                None => (None, Vec::new()),
            };
            candidates.push(Candidate {
                device: peripheral,
                name,
                services,
            });
        }
        Ok(candidates)
    }

    async fn open_channel(
        &self,
        device: &Peripheral,
        service: Uuid,
        characteristic: Uuid,
    ) -> Result<BtleChannel, SessionError> {
        device
            .connect()
            .await
            .map_err(|e| link_error("Connecting", e))?;
        device
            .discover_services()
            .await
            .map_err(|e| link_error("Discovering services", e))?;

        let services = device.services();
        let printer_service = services
            .iter()
            .find(|s| s.uuid == service)
            .ok_or_else(|| SessionError::ServiceNotFound(service.to_string()))?;
        let write_characteristic = printer_service
            .characteristics
            .iter()
            .find(|c| c.uuid == characteristic)
            .cloned()
            .ok_or_else(|| SessionError::CharacteristicNotFound(characteristic.to_string()))?;

        Ok(BtleChannel {
            peripheral: device.clone(),
            characteristic: write_characteristic,
        })
    }

    async fn write(&self, channel: &BtleChannel, data: &[u8]) -> Result<(), SessionError> {
        channel
            .peripheral
            .write(&channel.characteristic, data, WriteType::WithResponse)
            .await
            .map_err(|e| link_error("Writing", e))
    }

    async fn is_link_up(&self, device: &Peripheral) -> bool {
        device.is_connected().await.unwrap_or(false)
    }

    async fn close(&self, device: &Peripheral) -> Result<(), SessionError> {
        device
            .disconnect()
            .await
            .map_err(|e| link_error("Disconnecting", e))
    }
}
