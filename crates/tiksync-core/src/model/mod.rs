// ── Domain model ──
//
// One typed record per collection. Every field is defaulted, so a record
// deserializes from whatever subset of fields the router reported.

mod dhcp;
mod host;
mod interface;
mod nat;
mod neighbor;
mod queue;
mod system;

pub use dhcp::{DhcpLease, DhcpNetwork, DhcpServer, StaticDns};
pub use host::{Host, HostSource, UNKNOWN};
pub(crate) use host::is_known;
pub use interface::{CounterSample, Interface};
pub use nat::NatRule;
pub use neighbor::{ArpEntry, BridgeHost, MULTIPLE, PortClient, TRACKING_DISABLED};
pub use queue::{Queue, Script};
pub use system::{FirmwareUpdate, Resource, Routerboard, Usage};
