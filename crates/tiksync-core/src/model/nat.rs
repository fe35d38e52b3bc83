use serde::{Deserialize, Serialize};

/// A destination-NAT rule, keyed by router id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct NatRule {
    #[serde(rename = ".id")]
    pub id: String,
    pub chain: String,
    pub action: String,
    pub protocol: String,
    pub dst_port: String,
    pub in_interface: String,
    pub out_interface: String,
    pub to_addresses: String,
    pub to_ports: String,
    pub comment: String,
    pub enabled: bool,
    /// `protocol:dst-port`.
    pub name: String,
    /// Composite identity used to find the rule again after renumbering.
    pub uniq_id: String,
}
