// Interface/ARP/bridge client attribution
//
// Bridge aggregation hides per-port ARP visibility: ARP entries learned
// on the bridge name the bridge, not the port. Per-port presence is only
// in the bridge host table, joined back to addresses through the ARP
// entries seen on the bridge.

use std::collections::HashMap;

use crate::model::{MULTIPLE, PortClient, TRACKING_DISABLED};
use crate::store::{Collection, RouterState};

/// Result of the ARP pass.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ArpPass {
    /// MAC -> address for entries learned on the bridge aggregate.
    pub mac2ip: HashMap<String, String>,
    /// Some ARP entry was learned on the bridge; the bridge host table
    /// must be consulted.
    pub bridge_used: bool,
}

/// Whether `name` is the bridge aggregate: the configured bridge name or
/// any interface of type `bridge`.
fn is_bridge_aggregate(state: &RouterState, name: &str, bridge_name: &str) -> bool {
    name == bridge_name
        || state
            .interface_key(name)
            .and_then(|key| state.interfaces.get(key))
            .is_some_and(|iface| iface.is_bridge())
}

/// Claim an interface slot. A second claimant turns both fields into the
/// `"multiple"` sentinel.
fn claim(slots: &mut Collection<PortClient>, key: &str, mac: &str, address: &str) {
    match slots.get_mut(key) {
        Some(slot) => {
            MULTIPLE.clone_into(&mut slot.mac_address);
            MULTIPLE.clone_into(&mut slot.address);
        }
        None => {
            slots.insert(
                key,
                PortClient {
                    interface: key.to_owned(),
                    mac_address: mac.to_owned(),
                    address: address.to_owned(),
                },
            );
        }
    }
}

/// Rebuild the port-client scratch collection from the ARP table.
pub fn attribute_arp(state: &mut RouterState, bridge_name: &str) -> ArpPass {
    let mut pass = ArpPass::default();
    let mut slots = Collection::default();

    for entry in state.arp.values() {
        if entry.interface.is_empty() {
            continue;
        }

        if is_bridge_aggregate(state, &entry.interface, bridge_name) {
            pass.bridge_used = true;
            if !entry.mac_address.is_empty() && !entry.address.is_empty() {
                pass.mac2ip
                    .insert(entry.mac_address.clone(), entry.address.clone());
            }
            continue;
        }

        let Some(key) = state.interface_key(&entry.interface) else {
            continue;
        };
        claim(&mut slots, key, &entry.mac_address, &entry.address);
    }

    state.port_clients = slots;
    pass
}

/// Attribute bridge host table entries to their ports, resolving each
/// MAC's address through the bridge ARP entries.
pub fn attribute_bridge_hosts(state: &mut RouterState, mac2ip: &HashMap<String, String>) {
    let mut slots = std::mem::take(&mut state.port_clients);

    for host in state.bridge_hosts.values() {
        let Some(key) = state.interface_key(&host.interface) else {
            continue;
        };
        if slots.contains_key(key) {
            claim(&mut slots, key, "", "");
            continue;
        }
        let address = mac2ip.get(&host.mac_address).map_or("", String::as_str);
        claim(&mut slots, key, &host.mac_address, address);
    }

    state.port_clients = slots;
}

/// Copy each interface's slot into its client fields, or clear them.
pub fn apply_port_clients(state: &mut RouterState) {
    for (key, iface) in state.interfaces.iter_mut() {
        match state.port_clients.get(key) {
            Some(slot) => {
                iface.client_ip_address.clone_from(&slot.address);
                iface.client_mac_address.clone_from(&slot.mac_address);
            }
            None => {
                iface.client_ip_address.clear();
                iface.client_mac_address.clear();
            }
        }
    }
}

/// ARP tracking is off: force every interface's client fields to the
/// `"disabled"` sentinel and drop the scratch tables.
pub fn mark_tracking_disabled(state: &mut RouterState) {
    state.arp.clear();
    state.bridge_hosts.clear();
    state.port_clients.clear();
    for iface in state.interfaces.values_mut() {
        TRACKING_DISABLED.clone_into(&mut iface.client_ip_address);
        TRACKING_DISABLED.clone_into(&mut iface.client_mac_address);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{ArpEntry, BridgeHost, Interface};

    fn state_with(ifaces: &[(&str, &str, &str)]) -> RouterState {
        let mut state = RouterState::default();
        for (key, name, kind) in ifaces {
            state.interfaces.insert(
                *key,
                Interface {
                    default_name: (*key).into(),
                    name: (*name).into(),
                    kind: (*kind).into(),
                    ..Interface::default()
                },
            );
        }
        state.reindex_interfaces();
        state
    }

    fn arp(id: &str, mac: &str, address: &str, interface: &str) -> (String, ArpEntry) {
        (
            id.to_owned(),
            ArpEntry {
                mac_address: mac.into(),
                address: address.into(),
                interface: interface.into(),
                ..ArpEntry::default()
            },
        )
    }

    fn bridge_host(id: &str, mac: &str, interface: &str) -> (String, BridgeHost) {
        (
            id.to_owned(),
            BridgeHost {
                mac_address: mac.into(),
                interface: interface.into(),
                bridge: "bridge".into(),
            },
        )
    }

    fn run(state: &mut RouterState) {
        let pass = attribute_arp(state, "bridge");
        if pass.bridge_used {
            attribute_bridge_hosts(state, &pass.mac2ip);
        }
        apply_port_clients(state);
    }

    #[test]
    fn direct_arp_entry_uses_display_name() {
        let mut state = state_with(&[("ether1", "wan", "ether")]);
        let (k, v) = arp("*1", "AA:00:00:00:00:01", "203.0.113.1", "wan");
        state.arp.insert(k, v);

        run(&mut state);

        let iface = state.interfaces.get("ether1").unwrap();
        assert_eq!(iface.client_mac_address, "AA:00:00:00:00:01");
        assert_eq!(iface.client_ip_address, "203.0.113.1");
    }

    #[test]
    fn two_clients_on_one_port_are_ambiguous() {
        let mut state = state_with(&[("ether2", "ether2", "ether")]);
        for (k, v) in [
            arp("*1", "AA:00:00:00:00:01", "10.0.0.1", "ether2"),
            arp("*2", "AA:00:00:00:00:02", "10.0.0.2", "ether2"),
        ] {
            state.arp.insert(k, v);
        }

        run(&mut state);

        let iface = state.interfaces.get("ether2").unwrap();
        assert_eq!(iface.client_mac_address, MULTIPLE);
        assert_eq!(iface.client_ip_address, MULTIPLE);
    }

    #[test]
    fn bridge_hosts_join_back_to_bridge_arp() {
        let mut state = state_with(&[
            ("ether3", "ether3", "ether"),
            ("ether4", "ether4", "ether"),
            ("bridge", "bridge", "bridge"),
        ]);
        let (k, v) = arp("*1", "AA:00:00:00:00:03", "192.168.88.3", "bridge");
        state.arp.insert(k, v);
        for (k, v) in [
            bridge_host("*A", "AA:00:00:00:00:03", "ether3"),
            bridge_host("*B", "AA:00:00:00:00:04", "ether4"),
        ] {
            state.bridge_hosts.insert(k, v);
        }

        run(&mut state);

        let ether3 = state.interfaces.get("ether3").unwrap();
        assert_eq!(ether3.client_mac_address, "AA:00:00:00:00:03");
        assert_eq!(ether3.client_ip_address, "192.168.88.3");

        // MAC seen only in the host table: no address to join.
        let ether4 = state.interfaces.get("ether4").unwrap();
        assert_eq!(ether4.client_mac_address, "AA:00:00:00:00:04");
        assert_eq!(ether4.client_ip_address, "");

        // The bridge itself carries no per-port client.
        assert_eq!(state.interfaces.get("bridge").unwrap().client_mac_address, "");
    }

    #[test]
    fn bridge_host_after_direct_arp_is_ambiguous() {
        let mut state = state_with(&[("ether5", "ether5", "ether")]);
        for (k, v) in [
            arp("*1", "AA:00:00:00:00:05", "10.0.0.5", "ether5"),
            arp("*2", "AA:00:00:00:00:06", "10.0.0.6", "bridge"),
        ] {
            state.arp.insert(k, v);
        }
        let (k, v) = bridge_host("*A", "AA:00:00:00:00:06", "ether5");
        state.bridge_hosts.insert(k, v);

        run(&mut state);

        let iface = state.interfaces.get("ether5").unwrap();
        assert_eq!(iface.client_mac_address, MULTIPLE);
        assert_eq!(iface.client_ip_address, MULTIPLE);
    }

    #[test]
    fn bridge_table_ignored_without_bridge_arp() {
        let mut state = state_with(&[("ether6", "ether6", "ether")]);
        let (k, v) = bridge_host("*A", "AA:00:00:00:00:07", "ether6");
        state.bridge_hosts.insert(k, v);

        let pass = attribute_arp(&mut state, "bridge");

        assert!(!pass.bridge_used);
        assert!(state.port_clients.is_empty());
    }

    #[test]
    fn stale_clients_are_cleared_next_cycle() {
        let mut state = state_with(&[("ether1", "ether1", "ether")]);
        let (k, v) = arp("*1", "AA:00:00:00:00:01", "10.0.0.1", "ether1");
        state.arp.insert(k, v);
        run(&mut state);

        state.arp.clear();
        run(&mut state);

        let iface = state.interfaces.get("ether1").unwrap();
        assert_eq!(iface.client_mac_address, "");
        assert!(state.port_clients.is_empty());
    }

    #[test]
    fn disabled_tracking_sets_sentinel() {
        let mut state = state_with(&[("ether1", "ether1", "ether"), ("ether2", "ether2", "ether")]);
        mark_tracking_disabled(&mut state);

        for iface in state.interfaces.values() {
            assert_eq!(iface.client_ip_address, TRACKING_DISABLED);
            assert_eq!(iface.client_mac_address, TRACKING_DISABLED);
        }
    }
}
