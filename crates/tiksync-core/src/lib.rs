//! Device-state reconciliation engine for RouterOS routers.
//!
//! This crate polls a router through [`tiksync_api::RouterApi`], maps the
//! raw records into typed collections, and cross-references them into a
//! consistent view of the router and the hosts behind it:
//!
//! - **[`Controller`]**: owns the update cycle. One cycle at a time runs
//!   fetch, map, merge and resolve under a guard, then publishes the model
//!   and signals subscribers once.
//!
//! - **[`DataStore`]**: the published [`RouterState`] snapshot, readable
//!   at any time without blocking a cycle, plus [`UpdateStream`]
//!   subscriptions.
//!
//! - **[`mapper`]**: declarative field mapping tables from raw records to
//!   the typed [`model`].
//!
//! - **[`reconcile`]**: cross-collection passes (port client attribution,
//!   NAT deduplication, host identity and liveness, rate conversion).
//!
//! - **[`Command`]**: typed writes resolved against the published model.

pub mod command;
pub mod config;
pub mod controller;
pub mod error;
pub mod mapper;
pub mod model;
pub mod reconcile;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{Command, CommandResult};
pub use config::{ControllerConfig, TlsVerification};
pub use controller::{ConnectionState, Controller, CycleOutcome};
pub use error::CoreError;
pub use reconcile::units::RateUnit;
pub use store::{Collection, DataStore, RouterState};
pub use stream::UpdateStream;
pub use tiksync_api::RestClient;

pub use model::{
    ArpEntry, BridgeHost, DhcpLease, DhcpNetwork, DhcpServer, FirmwareUpdate, Host, HostSource,
    Interface, NatRule, PortClient, Queue, Resource, Routerboard, Script, StaticDns, Usage,
};
