use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A physical or logical router interface, keyed by its default name
/// (or its name when it has none, as bridges and VLANs do).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Interface {
    #[serde(rename = ".id")]
    pub id: String,
    pub default_name: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub running: bool,
    pub enabled: bool,
    pub port_mac_address: String,
    pub comment: String,
    pub about: String,
    pub last_link_down_time: String,
    pub last_link_up_time: String,
    pub link_downs: i64,
    pub rx_byte: i64,
    pub tx_byte: i64,
    pub tx_queue_drop: i64,
    pub actual_mtu: i64,

    // Derived, kept across cycles.
    pub client_ip_address: String,
    pub client_mac_address: String,
    pub rx_bits_per_second: i64,
    pub tx_bits_per_second: i64,
    pub rx_rate: String,
    pub tx_rate: String,
    pub counter_sample: Option<CounterSample>,
}

impl Interface {
    pub fn is_bridge(&self) -> bool {
        self.kind == "bridge"
    }

    /// Virtual interfaces (VLAN, wireless virtual AP) report a port MAC
    /// that cannot address them; the router matches them by name.
    pub fn is_virtual(&self) -> bool {
        self.port_mac_address.contains('-')
    }
}

/// Byte counters captured at the end of a cycle, used to derive rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CounterSample {
    pub rx_byte: i64,
    pub tx_byte: i64,
    pub at: DateTime<Utc>,
}
