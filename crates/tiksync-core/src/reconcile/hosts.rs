// Host identity merge and liveness
//
// The host registry is the union of DHCP leases and ARP entries keyed by
// MAC address. Hosts are created lazily, never removed, and keep the
// source that first reported them. Liveness comes from ARP pings issued
// through the router.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use futures_util::stream;
use tiksync_api::RouterApi;
use tracing::debug;

use crate::model::{Host, HostSource, is_known};
use crate::store::RouterState;

/// Create hosts for newly seen MACs, refresh address and interface of
/// known ones, and backfill missing attributes.
///
/// A lease is authoritative over an ARP entry for the same MAC.
pub fn merge_hosts(state: &mut RouterState) {
    let hosts = &mut state.hosts;

    for (mac, lease) in state.dhcp_leases.iter() {
        let host = hosts.get_or_insert_with(mac, || Host::new(mac, HostSource::Dhcp));
        if is_known(&lease.address) {
            host.address.clone_from(&lease.address);
        }
        if is_known(&lease.interface) {
            host.interface.clone_from(&lease.interface);
        }
    }

    for entry in state.arp.values() {
        let mac = entry.mac_address.as_str();
        if mac.is_empty() || state.dhcp_leases.contains_key(mac) {
            continue;
        }
        let host = hosts.get_or_insert_with(mac, || Host::new(mac, HostSource::Arp));
        if is_known(&entry.address) {
            host.address.clone_from(&entry.address);
        }
        if !entry.interface.is_empty() {
            host.interface.clone_from(&entry.interface);
        }
    }

    for host in hosts.values_mut() {
        host.backfill();
    }
}

/// First label of a DNS name: `nas.home.lan` -> `nas`.
fn first_label(name: &str) -> &str {
    name.split('.').next().unwrap_or(name)
}

/// Resolve every host's display name. Precedence: static DNS entry for
/// the host's address, lease comment, lease host-name, the MAC itself.
pub fn resolve_hostnames(state: &mut RouterState) {
    let mut dns_by_address: HashMap<&str, &str> = HashMap::new();
    for entry in state.dns.values() {
        if !entry.address.is_empty() && !entry.name.is_empty() {
            dns_by_address
                .entry(entry.address.as_str())
                .or_insert(entry.name.as_str());
        }
    }

    for (mac, host) in state.hosts.iter_mut() {
        let lease = state.dhcp_leases.get(mac);

        let from_dns = is_known(&host.address)
            .then(|| dns_by_address.get(host.address.as_str()))
            .flatten()
            .copied()
            .map(first_label);
        let from_comment = lease
            .map(|l| l.comment.as_str())
            .filter(|c| !c.is_empty());
        let from_lease = lease
            .map(|l| l.host_name.as_str())
            .filter(|n| is_known(n));

        let name = from_dns
            .or(from_comment)
            .or(from_lease)
            .unwrap_or(mac.as_str());
        name.clone_into(&mut host.host_name);
    }
}

/// One host to ping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTarget {
    pub mac: String,
    pub address: String,
    pub interface: String,
}

/// Hosts whose address and interface are both known.
pub fn probe_targets(state: &RouterState) -> Vec<ProbeTarget> {
    state
        .hosts
        .iter()
        .filter(|(_, host)| host.is_probeable())
        .map(|(mac, host)| ProbeTarget {
            mac: mac.clone(),
            address: host.address.clone(),
            interface: host.interface.clone(),
        })
        .collect()
}

/// Ping every target with at most `concurrency` probes in flight.
/// Probe errors count as unreachable.
pub async fn probe_all<A: RouterApi>(
    api: &A,
    targets: Vec<ProbeTarget>,
    concurrency: usize,
) -> Vec<(String, bool)> {
    stream::iter(targets)
        .map(|target| async move {
            let reachable = match api.probe(&target.address, &target.interface).await {
                Ok(reachable) => reachable,
                Err(e) => {
                    debug!(mac = %target.mac, address = %target.address, error = %e, "probe failed");
                    false
                }
            };
            (target.mac, reachable)
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await
}

/// Record probe results. A failed probe clears `available` but keeps the
/// last successful sighting.
pub fn apply_probes(state: &mut RouterState, results: &[(String, bool)], now: DateTime<Utc>) {
    for (mac, reachable) in results {
        if let Some(host) = state.hosts.get_mut(mac) {
            host.available = *reachable;
            if *reachable {
                host.last_seen = Some(now);
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{ArpEntry, DhcpLease, StaticDns, UNKNOWN};

    const MAC_A: &str = "AA:00:00:00:00:0A";
    const MAC_B: &str = "AA:00:00:00:00:0B";

    fn lease(address: &str, host_name: &str, comment: &str) -> DhcpLease {
        DhcpLease {
            mac_address: MAC_A.into(),
            address: address.into(),
            host_name: host_name.into(),
            comment: comment.into(),
            interface: "bridge".into(),
            ..DhcpLease::default()
        }
    }

    fn arp_entry(mac: &str, address: &str) -> ArpEntry {
        ArpEntry {
            mac_address: mac.into(),
            address: address.into(),
            interface: "bridge".into(),
            ..ArpEntry::default()
        }
    }

    #[test]
    fn first_source_wins() {
        let mut state = RouterState::default();
        state.arp.insert("*1", arp_entry(MAC_B, "192.168.88.11"));
        merge_hosts(&mut state);

        state
            .dhcp_leases
            .insert(MAC_B, lease("192.168.88.12", "laptop", ""));
        merge_hosts(&mut state);

        let host = state.hosts.get(MAC_B).unwrap();
        assert_eq!(host.source, HostSource::Arp);
        assert_eq!(host.address, "192.168.88.12");
    }

    #[test]
    fn lease_is_preferred_over_arp() {
        let mut state = RouterState::default();
        state
            .dhcp_leases
            .insert(MAC_A, lease("192.168.88.10", "nas", ""));
        state.arp.insert("*1", arp_entry(MAC_A, "192.168.88.99"));

        merge_hosts(&mut state);

        let host = state.hosts.get(MAC_A).unwrap();
        assert_eq!(host.source, HostSource::Dhcp);
        assert_eq!(host.address, "192.168.88.10");
        assert_eq!(host.interface, "bridge");
    }

    #[test]
    fn hosts_persist_after_sources_vanish() {
        let mut state = RouterState::default();
        state.arp.insert("*1", arp_entry(MAC_B, "192.168.88.11"));
        merge_hosts(&mut state);

        state.arp.clear();
        merge_hosts(&mut state);

        assert!(state.hosts.contains_key(MAC_B));
    }

    #[test]
    fn missing_attributes_are_backfilled() {
        let mut state = RouterState::default();
        state.arp.insert(
            "*1",
            ArpEntry {
                mac_address: MAC_B.into(),
                ..ArpEntry::default()
            },
        );
        merge_hosts(&mut state);

        let host = state.hosts.get(MAC_B).unwrap();
        assert_eq!(host.address, UNKNOWN);
        assert_eq!(host.interface, UNKNOWN);
        assert_eq!(host.host_name, UNKNOWN);
        assert!(!host.available);
        assert!(!host.is_probeable());
    }

    #[test]
    fn dns_label_beats_comment_and_lease_name() {
        let mut state = RouterState::default();
        state
            .dhcp_leases
            .insert(MAC_A, lease("192.168.88.10", "android-123", "Living room TV"));
        state.dns.insert(
            "tv.home.lan",
            StaticDns {
                name: "tv.home.lan".into(),
                address: "192.168.88.10".into(),
                ..StaticDns::default()
            },
        );
        merge_hosts(&mut state);
        resolve_hostnames(&mut state);

        assert_eq!(state.hosts.get(MAC_A).unwrap().host_name, "tv");
    }

    #[test]
    fn hostname_fallback_chain() {
        let mut state = RouterState::default();
        state
            .dhcp_leases
            .insert(MAC_A, lease("192.168.88.10", "android-123", "Living room TV"));
        merge_hosts(&mut state);
        resolve_hostnames(&mut state);
        assert_eq!(state.hosts.get(MAC_A).unwrap().host_name, "Living room TV");

        state
            .dhcp_leases
            .insert(MAC_A, lease("192.168.88.10", "android-123", ""));
        resolve_hostnames(&mut state);
        assert_eq!(state.hosts.get(MAC_A).unwrap().host_name, "android-123");

        state
            .dhcp_leases
            .insert(MAC_A, lease("192.168.88.10", UNKNOWN, ""));
        resolve_hostnames(&mut state);
        assert_eq!(state.hosts.get(MAC_A).unwrap().host_name, MAC_A);
    }

    #[test]
    fn failed_probe_keeps_last_seen() {
        let mut state = RouterState::default();
        state.arp.insert("*1", arp_entry(MAC_B, "192.168.88.11"));
        merge_hosts(&mut state);

        let seen = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        apply_probes(&mut state, &[(MAC_B.to_owned(), true)], seen);
        let later = Utc.with_ymd_and_hms(2026, 1, 2, 3, 5, 5).unwrap();
        apply_probes(&mut state, &[(MAC_B.to_owned(), false)], later);

        let host = state.hosts.get(MAC_B).unwrap();
        assert!(!host.available);
        assert_eq!(host.last_seen, Some(seen));
    }

    #[test]
    fn only_resolved_hosts_are_probed() {
        let mut state = RouterState::default();
        state.arp.insert("*1", arp_entry(MAC_B, "192.168.88.11"));
        state.arp.insert(
            "*2",
            ArpEntry {
                mac_address: MAC_A.into(),
                ..ArpEntry::default()
            },
        );
        merge_hosts(&mut state);

        let targets = probe_targets(&state);
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].mac, MAC_B);
    }
}
