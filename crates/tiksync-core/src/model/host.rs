use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Sentinel for a host attribute no source has reported yet.
pub const UNKNOWN: &str = "unknown";

/// Which table first reported a host. First writer wins.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum HostSource {
    #[default]
    Dhcp,
    Arp,
}

/// A network host, keyed by MAC address. Never removed once seen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Host {
    pub source: HostSource,
    pub mac_address: String,
    pub address: String,
    pub interface: String,
    pub host_name: String,
    /// Last successful liveness probe.
    pub last_seen: Option<DateTime<Utc>>,
    pub available: bool,
}

impl Host {
    pub fn new(mac_address: &str, source: HostSource) -> Self {
        let mut host = Self {
            source,
            mac_address: mac_address.to_owned(),
            ..Self::default()
        };
        host.backfill();
        host
    }

    /// Fill any attribute still empty with the `"unknown"` sentinel.
    pub fn backfill(&mut self) {
        for value in [
            &mut self.mac_address,
            &mut self.address,
            &mut self.interface,
            &mut self.host_name,
        ] {
            if value.is_empty() {
                UNKNOWN.clone_into(value);
            }
        }
    }

    /// Address and interface are both known, so the host can be probed.
    pub fn is_probeable(&self) -> bool {
        is_known(&self.address) && is_known(&self.interface)
    }
}

pub(crate) fn is_known(value: &str) -> bool {
    !value.is_empty() && value != UNKNOWN
}
