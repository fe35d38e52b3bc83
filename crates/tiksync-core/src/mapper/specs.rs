// Mapping tables for every router collection.

use super::{Filter, JoinPart, JoinSpec, Literal, MapSpec, ensure, field};

pub const INTERFACE: MapSpec = MapSpec {
    entity: "interface",
    key: "default-name",
    key_fallback: Some("name"),
    filter: None,
    fields: &[
        field(".id"),
        field("default-name"),
        field("name").or_field("default-name"),
        field("type").or_str("unknown"),
        field("running").boolean(),
        field("enabled").from("disabled").inverted(),
        field("port-mac-address").from("mac-address"),
        field("comment"),
        field("about"),
        field("last-link-down-time"),
        field("last-link-up-time"),
        field("link-downs").int(),
        field("rx-byte").int(),
        field("tx-byte").int(),
        field("tx-queue-drop").int(),
        field("actual-mtu").int(),
    ],
    ensure: &[
        ensure("client-ip-address", Literal::Str("")),
        ensure("client-mac-address", Literal::Str("")),
        ensure("rx-bits-per-second", Literal::Int(0)),
        ensure("tx-bits-per-second", Literal::Int(0)),
    ],
    joins: &[],
};

pub const ARP: MapSpec = MapSpec {
    entity: "arp",
    key: ".id",
    key_fallback: Some("mac-address"),
    filter: Some(Filter::NotTruthy("invalid")),
    fields: &[
        field("mac-address"),
        field("address"),
        field("interface"),
        field("dynamic").boolean(),
        field("comment"),
    ],
    ensure: &[],
    joins: &[],
};

pub const BRIDGE_HOST: MapSpec = MapSpec {
    entity: "bridge-host",
    key: ".id",
    key_fallback: Some("mac-address"),
    filter: Some(Filter::NotTruthy("local")),
    fields: &[field("mac-address"), field("interface"), field("bridge")],
    ensure: &[],
    joins: &[],
};

pub const NAT: MapSpec = MapSpec {
    entity: "nat",
    key: ".id",
    key_fallback: None,
    filter: Some(Filter::Equals {
        field: "action",
        value: "dst-nat",
    }),
    fields: &[
        field(".id"),
        field("chain"),
        field("action"),
        field("protocol"),
        field("dst-port"),
        field("in-interface").or_str("any"),
        field("out-interface").or_str("any"),
        field("to-addresses"),
        field("to-ports"),
        field("comment"),
        field("enabled").from("disabled").inverted(),
    ],
    ensure: &[],
    joins: &[
        JoinSpec {
            name: "name",
            parts: &[
                JoinPart::Field("protocol"),
                JoinPart::Text(":"),
                JoinPart::Field("dst-port"),
            ],
        },
        JoinSpec {
            name: "uniq-id",
            parts: &[
                JoinPart::Field("chain"),
                JoinPart::Text(","),
                JoinPart::Field("action"),
                JoinPart::Text(","),
                JoinPart::Field("protocol"),
                JoinPart::Text(","),
                JoinPart::Field("in-interface"),
                JoinPart::Text(":"),
                JoinPart::Field("dst-port"),
                JoinPart::Text("-"),
                JoinPart::Field("out-interface"),
                JoinPart::Text(":"),
                JoinPart::Field("to-addresses"),
                JoinPart::Text(":"),
                JoinPart::Field("to-ports"),
            ],
        },
    ],
};

pub const DHCP_SERVER: MapSpec = MapSpec {
    entity: "dhcp-server",
    key: "name",
    key_fallback: None,
    filter: None,
    fields: &[field("name"), field("interface")],
    ensure: &[],
    joins: &[],
};

pub const DHCP_NETWORK: MapSpec = MapSpec {
    entity: "dhcp-network",
    key: "address",
    key_fallback: None,
    filter: None,
    fields: &[
        field("address"),
        field("gateway"),
        field("netmask"),
        field("dns-server"),
        field("domain"),
        field("comment"),
    ],
    ensure: &[],
    joins: &[],
};

pub const DHCP_LEASE: MapSpec = MapSpec {
    entity: "dhcp-lease",
    key: "mac-address",
    key_fallback: None,
    filter: None,
    fields: &[
        field("mac-address"),
        field("address").or_str("unknown"),
        field("host-name").or_str("unknown"),
        field("status").or_str("unknown"),
        field("last-seen").or_str("unknown"),
        field("server").or_str("unknown"),
        field("comment"),
        field("enabled").from("disabled").inverted(),
        field("available").from("status").equals("bound"),
    ],
    ensure: &[ensure("interface", Literal::Str("unknown"))],
    joins: &[],
};

pub const STATIC_DNS: MapSpec = MapSpec {
    entity: "dns",
    key: "name",
    key_fallback: None,
    filter: None,
    fields: &[
        field("name"),
        field("address"),
        field("comment"),
        field("enabled").from("disabled").inverted(),
    ],
    ensure: &[],
    joins: &[],
};

pub const RESOURCE: MapSpec = MapSpec {
    entity: "resource",
    key: "board-name",
    key_fallback: None,
    filter: None,
    fields: &[
        field("platform").or_str("unknown"),
        field("board-name").or_str("unknown"),
        field("version").or_str("unknown"),
        field("uptime").or_str("unknown"),
        field("cpu-load").or_str("unknown"),
        field("total-memory").optional_int(),
        field("free-memory").optional_int(),
        field("total-hdd-space").optional_int(),
        field("free-hdd-space").optional_int(),
    ],
    ensure: &[],
    joins: &[],
};

pub const ROUTERBOARD: MapSpec = MapSpec {
    entity: "routerboard",
    key: "serial-number",
    key_fallback: None,
    filter: None,
    fields: &[
        field("routerboard").boolean(),
        field("model").or_str("unknown"),
        field("serial-number").or_str("unknown"),
        field("firmware").from("current-firmware").or_str("unknown"),
        field("upgrade-firmware").or_str("unknown"),
    ],
    ensure: &[],
    joins: &[],
};

pub const FIRMWARE_UPDATE: MapSpec = MapSpec {
    entity: "firmware-update",
    key: "installed-version",
    key_fallback: None,
    filter: None,
    fields: &[
        field("available")
            .from("status")
            .equals("New version is available"),
        field("status").or_str("unknown"),
        field("channel").or_str("unknown"),
        field("installed-version").or_str("unknown"),
        field("latest-version").or_str("unknown"),
    ],
    ensure: &[],
    joins: &[],
};

pub const QUEUE: MapSpec = MapSpec {
    entity: "queue",
    key: "name",
    key_fallback: None,
    filter: None,
    fields: &[
        field(".id"),
        field("name"),
        field("target"),
        field("comment"),
        field("enabled").from("disabled").inverted(),
        field("max-limit").or_str("0/0"),
        field("limit-at").or_str("0/0"),
        field("burst-limit").or_str("0/0"),
        field("burst-threshold").or_str("0/0"),
        field("burst-time").or_str("0s/0s"),
        field("rate").or_str("0/0"),
    ],
    ensure: &[],
    joins: &[],
};

pub const SCRIPT: MapSpec = MapSpec {
    entity: "script",
    key: "name",
    key_fallback: None,
    filter: None,
    fields: &[
        field(".id"),
        field("name"),
        field("comment"),
        field("last-started").or_str("unknown"),
        field("run-count").int(),
    ],
    ensure: &[],
    joins: &[],
};
