// ── Router model ──
//
// The complete reconciled view of one router. Owned by whichever cycle
// holds the guard; consumers only ever see published clones.

use std::collections::HashMap;
use std::net::Ipv4Addr;

use serde::Serialize;

use super::Collection;
use crate::model::{
    ArpEntry, BridgeHost, DhcpLease, DhcpNetwork, DhcpServer, FirmwareUpdate, Host, Interface,
    NatRule, PortClient, Queue, Resource, Routerboard, Script, StaticDns,
};

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct RouterState {
    pub interfaces: Collection<Interface>,
    pub arp: Collection<ArpEntry>,
    pub bridge_hosts: Collection<BridgeHost>,
    pub port_clients: Collection<PortClient>,
    pub nat: Collection<NatRule>,
    pub dhcp_servers: Collection<DhcpServer>,
    pub dhcp_networks: Collection<DhcpNetwork>,
    pub dhcp_leases: Collection<DhcpLease>,
    pub dns: Collection<StaticDns>,
    pub hosts: Collection<Host>,
    pub queues: Collection<Queue>,
    pub scripts: Collection<Script>,
    pub resource: Resource,
    pub routerboard: Routerboard,
    pub firmware: FirmwareUpdate,

    /// Display name -> interface key, rebuilt after every interface fetch.
    #[serde(skip)]
    interface_index: HashMap<String, String>,
}

impl RouterState {
    /// Rebuild the display-name index from the interface collection.
    pub fn reindex_interfaces(&mut self) {
        self.interface_index = self
            .interfaces
            .iter()
            .map(|(key, iface)| (iface.name.clone(), key.clone()))
            .collect();
    }

    /// Resolve an interface display name (as ARP and bridge tables report
    /// it) to the interface's stable key.
    pub fn interface_key(&self, name: &str) -> Option<&str> {
        self.interface_index.get(name).map(String::as_str)
    }

    /// Look up an interface by key, then by current display name.
    pub fn interface(&self, key_or_name: &str) -> Option<(&str, &Interface)> {
        let key = if self.interfaces.contains_key(key_or_name) {
            key_or_name
        } else {
            self.interface_key(key_or_name)?
        };
        self.interfaces
            .get_key_value(key)
            .map(|(k, iface)| (k.as_str(), iface))
    }

    /// The DHCP network whose parsed CIDR contains `address`.
    pub fn network_for(&self, address: &str) -> Option<&DhcpNetwork> {
        let addr: Ipv4Addr = address.parse().ok()?;
        self.dhcp_networks
            .values()
            .filter_map(|n| n.cidr.map(|c| (c, n)))
            .filter(|(c, _)| c.contains(addr))
            .max_by_key(|(c, _)| c.prefix())
            .map(|(_, n)| n)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn iface(name: &str) -> Interface {
        Interface {
            name: name.into(),
            ..Interface::default()
        }
    }

    #[test]
    fn index_maps_display_names_to_keys() {
        let mut state = RouterState::default();
        state.interfaces.insert("ether1", iface("wan"));
        state.interfaces.insert("ether2", iface("ether2"));
        state.reindex_interfaces();

        assert_eq!(state.interface_key("wan"), Some("ether1"));
        assert_eq!(state.interface_key("ether1"), None);
        assert_eq!(state.interface("ether1").unwrap().0, "ether1");
        assert_eq!(state.interface("wan").unwrap().0, "ether1");
    }

    #[test]
    fn network_lookup_prefers_most_specific() {
        let mut state = RouterState::default();
        for address in ["10.0.0.0/8", "10.1.0.0/16"] {
            state.dhcp_networks.insert(
                address,
                DhcpNetwork {
                    address: address.into(),
                    cidr: Some(address.parse().unwrap()),
                    ..DhcpNetwork::default()
                },
            );
        }

        assert_eq!(state.network_for("10.1.2.3").unwrap().address, "10.1.0.0/16");
        assert_eq!(state.network_for("10.9.2.3").unwrap().address, "10.0.0.0/8");
        assert!(state.network_for("192.168.1.1").is_none());
        assert!(state.network_for("unknown").is_none());
    }
}
