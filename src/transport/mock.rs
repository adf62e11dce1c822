//! Scripted in-memory adapter.
//!
//! Behaves like a printer that accepts every write, unless told otherwise.
//! Records everything it is asked to do so tests can assert on ordering, and
//! backs the `--simulate` CLI flag.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Notify;
use uuid::Uuid;

use super::adapter::{Candidate, DiscoveryRequest, PRINTER_SERVICE_UUID, PeripheralAdapter};
use crate::error::SessionError;

/// Where [`MockAdapter::open_channel`] should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenFailure {
    /// Connecting fails; no link is opened
    Link,
    /// Link opens, service lookup fails
    Service,
    /// Link opens, characteristic lookup fails
    Characteristic,
}

/// Write lifecycle markers, in the order they happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockCall {
    Begin(usize),
    End(usize),
}

#[derive(Debug, Clone)]
struct MockDevice {
    id: u32,
    name: Option<String>,
    services: Vec<Uuid>,
}

#[derive(Debug, Default)]
struct MockState {
    devices: Vec<MockDevice>,
    unsupported: Option<String>,
    fail_open: Option<OpenFailure>,
    fail_write_at: Option<usize>,
    discover_gate: Option<Arc<Notify>>,
    probes: usize,
    write_attempts: usize,
    writes: Vec<Vec<u8>>,
    calls: Vec<MockCall>,
    open_links: HashSet<u32>,
}

/// Cloning shares the recorded state.
#[derive(Debug, Clone, Default)]
pub struct MockAdapter {
    inner: Arc<Mutex<MockState>>,
}

impl MockAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A single named printer advertising the printer service.
    pub fn simulated() -> Self {
        Self::new().with_printer("ZD421 (simulated)")
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        // A panicking test thread must not hide the recorded state
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn with_printer(self, name: &str) -> Self {
        self.with_device(Some(name), vec![PRINTER_SERVICE_UUID])
    }

    pub fn with_device(self, name: Option<&str>, services: Vec<Uuid>) -> Self {
        {
            let mut state = self.state();
            let id = state.devices.len() as u32 + 1;
            state.devices.push(MockDevice {
                id,
                name: name.map(str::to_string),
                services,
            });
        }
        self
    }

    pub fn unsupported(self, reason: &str) -> Self {
        self.state().unsupported = Some(reason.to_string());
        self
    }

    pub fn fail_open(self, failure: OpenFailure) -> Self {
        self.state().fail_open = Some(failure);
        self
    }

    /// Let `open_channel` succeed again.
    pub fn clear_open_failure(&self) {
        self.state().fail_open = None;
    }

    /// Fail the write with this zero-based index.
    pub fn fail_write_at(self, index: usize) -> Self {
        self.state().fail_write_at = Some(index);
        self
    }

    /// Hold discovery until the gate is notified.
    pub fn gate_discovery(self, gate: Arc<Notify>) -> Self {
        self.state().discover_gate = Some(gate);
        self
    }

    /// Simulate the printer going out of range.
    pub fn drop_link(&self) {
        self.state().open_links.clear();
    }

    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.state().writes.clone()
    }

    pub fn written_bytes(&self) -> Vec<u8> {
        self.state().writes.concat()
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.state().calls.clone()
    }

    pub fn open_links(&self) -> usize {
        self.state().open_links.len()
    }

    pub fn probe_count(&self) -> usize {
        self.state().probes
    }
}

#[async_trait]
impl PeripheralAdapter for MockAdapter {
    type Device = u32;
    type Channel = u32;

    async fn probe(&self) -> Result<(), SessionError> {
        let mut state = self.state();
        state.probes += 1;
        match &state.unsupported {
            Some(reason) => Err(SessionError::Unsupported(reason.clone())),
            None => Ok(()),
        }
    }

    async fn discover(
        &self,
        _request: &DiscoveryRequest,
    ) -> Result<Vec<Candidate<u32>>, SessionError> {
        let gate = self.state().discover_gate.clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        Ok(self
            .state()
            .devices
            .iter()
            .map(|d| Candidate {
                device: d.id,
                name: d.name.clone(),
                services: d.services.clone(),
            })
            .collect())
    }

    async fn open_channel(
        &self,
        device: &u32,
        service: Uuid,
        characteristic: Uuid,
    ) -> Result<u32, SessionError> {
        let mut state = self.state();
        if state.fail_open == Some(OpenFailure::Link) {
            return Err(SessionError::Link("simulated connect failure".to_string()));
        }
        state.open_links.insert(*device);
        match state.fail_open {
            Some(OpenFailure::Service) => Err(SessionError::ServiceNotFound(service.to_string())),
            Some(OpenFailure::Characteristic) => Err(SessionError::CharacteristicNotFound(
                characteristic.to_string(),
            )),
            _ => Ok(*device),
        }
    }

    async fn write(&self, _channel: &u32, data: &[u8]) -> Result<(), SessionError> {
        let index = {
            let mut state = self.state();
            let index = state.write_attempts;
            state.write_attempts += 1;
            if state.fail_write_at == Some(index) {
                return Err(SessionError::Link("simulated write failure".to_string()));
            }
            state.calls.push(MockCall::Begin(index));
            index
        };

        tokio::task::yield_now().await;

        let mut state = self.state();
        state.writes.push(data.to_vec());
        state.calls.push(MockCall::End(index));
        Ok(())
    }

    async fn is_link_up(&self, device: &u32) -> bool {
        self.state().open_links.contains(device)
    }

    async fn close(&self, device: &u32) -> Result<(), SessionError> {
        self.state().open_links.remove(device);
        Ok(())
    }
}
