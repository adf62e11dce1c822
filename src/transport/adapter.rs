//! Platform boundary for wireless printers.
//!
//! A [`PeripheralAdapter`] hides the platform BLE API behind six async
//! operations. The session state machine only ever talks to this trait, so it
//! runs unchanged against real hardware ([`super::BtleAdapter`]) and against
//! the scripted [`super::MockAdapter`].

use async_trait::async_trait;
use std::time::Duration;
use uuid::Uuid;

use crate::error::SessionError;

/// GATT service exposed by the supported printers.
pub const PRINTER_SERVICE_UUID: Uuid = Uuid::from_u128(0x38eb4a80_c570_11e3_9507_0002a5d5c51b);

/// Writable characteristic on [`PRINTER_SERVICE_UUID`] that accepts ZPL.
pub const WRITE_CHARACTERISTIC_UUID: Uuid =
    Uuid::from_u128(0x38eb4a82_c570_11e3_9507_0002a5d5c51b);

/// Advertised-name prefixes accepted during discovery, best first.
pub const NAME_PREFIXES: [&str; 3] = ["Zebra", "ZD", "Printer"];

/// Name reported for a device that advertises none.
pub const DEFAULT_DEVICE_NAME: &str = "Unknown Zebra";

/// How long a real scan listens for advertisements.
pub const DEFAULT_SCAN_DURATION: Duration = Duration::from_secs(5);

/// One device seen during discovery.
#[derive(Debug, Clone)]
pub struct Candidate<D> {
    pub device: D,
    /// Advertised local name
    pub name: Option<String>,
    /// Advertised service UUIDs
    pub services: Vec<Uuid>,
}

/// Discovery filters.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryRequest {
    /// Exact device name; outranks every other filter
    pub preferred_name: Option<String>,
    pub name_prefixes: Vec<String>,
    pub service: Uuid,
    pub scan_duration: Duration,
}

impl Default for DiscoveryRequest {
    fn default() -> Self {
        Self::printer(None)
    }
}

impl DiscoveryRequest {
    /// The standard printer filter set, optionally preferring one name.
    pub fn printer(preferred_name: Option<&str>) -> Self {
        Self {
            preferred_name: preferred_name
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
            name_prefixes: NAME_PREFIXES.iter().map(|p| p.to_string()).collect(),
            service: PRINTER_SERVICE_UUID,
            scan_duration: DEFAULT_SCAN_DURATION,
        }
    }

    /// Rank of a candidate, lower is better. `None` if it matches no filter.
    ///
    /// Exact preferred name, then name prefixes in order, then service UUID.
    pub fn rank<D>(&self, candidate: &Candidate<D>) -> Option<usize> {
        let name = candidate.name.as_deref();

        if let (Some(preferred), Some(name)) = (self.preferred_name.as_deref(), name)
            && preferred == name
        {
            return Some(0);
        }

        if let Some(name) = name
            && let Some(index) = self
                .name_prefixes
                .iter()
                .position(|p| name.starts_with(p.as_str()))
        {
            return Some(1 + index);
        }

        if candidate.services.contains(&self.service) {
            return Some(1 + self.name_prefixes.len());
        }

        None
    }

    pub fn matches<D>(&self, candidate: &Candidate<D>) -> bool {
        self.rank(candidate).is_some()
    }

    /// Best matching candidate. Ties go to the one discovered first.
    pub fn select<D>(&self, candidates: Vec<Candidate<D>>) -> Option<Candidate<D>> {
        candidates
            .into_iter()
            .filter_map(|c| self.rank(&c).map(|rank| (rank, c)))
            .min_by_key(|(rank, _)| *rank)
            .map(|(_, c)| c)
    }
}

/// Async access to a platform's BLE stack.
///
/// Errors use [`SessionError`]: `Unsupported` from [`probe`](Self::probe),
/// `ServiceNotFound`/`CharacteristicNotFound` from
/// [`open_channel`](Self::open_channel), `Link` for anything else.
#[async_trait]
pub trait PeripheralAdapter: Send + Sync + 'static {
    type Device: Clone + Send + Sync;
    type Channel: Send + Sync;

    /// Check that wireless printing is possible at all.
    async fn probe(&self) -> Result<(), SessionError>;

    /// Scan and return every device seen. Filtering is up to the caller.
    async fn discover(
        &self,
        request: &DiscoveryRequest,
    ) -> Result<Vec<Candidate<Self::Device>>, SessionError>;

    /// Connect and resolve the writable characteristic.
    ///
    /// On error the link may be left open; callers close it.
    async fn open_channel(
        &self,
        device: &Self::Device,
        service: Uuid,
        characteristic: Uuid,
    ) -> Result<Self::Channel, SessionError>;

    /// One acknowledged write.
    async fn write(&self, channel: &Self::Channel, data: &[u8]) -> Result<(), SessionError>;

    async fn is_link_up(&self, device: &Self::Device) -> bool;

    async fn close(&self, device: &Self::Device) -> Result<(), SessionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(id: u32, name: &str) -> Candidate<u32> {
        Candidate {
            device: id,
            name: Some(name.to_string()),
            services: vec![],
        }
    }

    #[test]
    fn test_uuid_constants() {
        assert_eq!(
            PRINTER_SERVICE_UUID.to_string(),
            "38eb4a80-c570-11e3-9507-0002a5d5c51b"
        );
        assert_eq!(
            WRITE_CHARACTERISTIC_UUID.to_string(),
            "38eb4a82-c570-11e3-9507-0002a5d5c51b"
        );
    }

    #[test]
    fn test_prefix_order() {
        let request = DiscoveryRequest::printer(None);
        let picked = request
            .select(vec![named(1, "Printer 7"), named(2, "ZD421"), named(3, "Zebra QLn")])
            .unwrap();
        assert_eq!(picked.device, 3);
    }

    #[test]
    fn test_preferred_name_wins() {
        let request = DiscoveryRequest::printer(Some("Printer 7"));
        let picked = request
            .select(vec![named(1, "Zebra QLn"), named(2, "Printer 7")])
            .unwrap();
        assert_eq!(picked.device, 2);
    }

    #[test]
    fn test_service_only_match() {
        let request = DiscoveryRequest::printer(None);
        let anonymous = Candidate {
            device: 9,
            name: None,
            services: vec![PRINTER_SERVICE_UUID],
        };
        assert_eq!(request.rank(&anonymous), Some(4));
        assert!(!request.matches(&named(1, "Headphones")));
        assert!(request.select(vec![named(1, "Headphones")]).is_none());
    }

    #[test]
    fn test_blank_preferred_name_ignored() {
        assert_eq!(DiscoveryRequest::printer(Some("  ")).preferred_name, None);
    }

    #[test]
    fn test_ties_keep_discovery_order() {
        let request = DiscoveryRequest::printer(None);
        let picked = request.select(vec![named(1, "ZD420"), named(2, "ZD421")]).unwrap();
        assert_eq!(picked.device, 1);
    }
}
