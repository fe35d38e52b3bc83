use ipnetwork::Ipv4Network;
use serde::{Deserialize, Serialize};

/// A DHCP lease, keyed by MAC address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct DhcpLease {
    pub mac_address: String,
    pub address: String,
    pub host_name: String,
    pub status: String,
    pub last_seen: String,
    pub server: String,
    pub comment: String,
    pub enabled: bool,
    /// `status == "bound"`.
    pub available: bool,
    /// Bound interface of the owning server.
    pub interface: String,
}

/// A DHCP server, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct DhcpServer {
    pub name: String,
    pub interface: String,
}

/// A DHCP network, keyed by its `a.b.c.d/len` address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct DhcpNetwork {
    pub address: String,
    pub gateway: String,
    pub netmask: String,
    pub dns_server: String,
    pub domain: String,
    pub comment: String,
    /// Parsed once from `address`; never recomputed once present.
    pub cidr: Option<Ipv4Network>,
}

/// A static DNS entry, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct StaticDns {
    pub name: String,
    pub address: String,
    pub comment: String,
    pub enabled: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn cidr_serializes_in_prefix_form() {
        let network = DhcpNetwork {
            address: "192.168.88.0/24".into(),
            cidr: Some("192.168.88.0/24".parse().unwrap()),
            ..DhcpNetwork::default()
        };

        let value = serde_json::to_value(&network).unwrap();
        assert_eq!(value["cidr"], json!("192.168.88.0/24"));

        let back: DhcpNetwork = serde_json::from_value(value).unwrap();
        assert_eq!(back, network);
    }
}
