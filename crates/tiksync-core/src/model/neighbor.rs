use serde::{Deserialize, Serialize};

/// Sentinel for an interface slot claimed by more than one client.
pub const MULTIPLE: &str = "multiple";

/// Sentinel written to client fields when ARP tracking is turned off.
pub const TRACKING_DISABLED: &str = "disabled";

/// One valid ARP table entry. Rebuilt every cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ArpEntry {
    pub mac_address: String,
    pub address: String,
    pub interface: String,
    pub dynamic: bool,
    pub comment: String,
}

/// One non-local bridge host table entry. Rebuilt every cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct BridgeHost {
    pub mac_address: String,
    pub interface: String,
    pub bridge: String,
}

/// Client attributed to an interface, keyed by the interface key.
/// Scratch: discarded and rebuilt every cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct PortClient {
    pub interface: String,
    pub mac_address: String,
    pub address: String,
}
