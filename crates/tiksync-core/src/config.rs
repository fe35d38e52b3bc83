// ── Runtime connection configuration ──
//
// These types describe how to reach a router and how often to reconcile.
// They carry credential data and tuning, but never touch disk. The CLI
// constructs a `ControllerConfig` and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::reconcile::units::RateUnit;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification. RouterOS ships a self-signed certificate.
    #[default]
    DangerAcceptInvalid,
}

/// Configuration for reconciling a single router.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Router URL (e.g., `https://192.168.88.1`).
    pub url: Url,
    pub username: String,
    pub password: SecretString,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Time between regular update cycles.
    pub scan_interval: Duration,
    /// Time between firmware update checks.
    pub firmware_check_interval: Duration,
    /// Bounded wait for the cycle guard before a triggered cycle is skipped.
    pub cycle_lock_timeout: Duration,
    /// Attribute ARP/bridge clients to interfaces.
    pub track_arp: bool,
    /// Maintain the host registry and probe liveness.
    pub track_hosts: bool,
    /// Display unit for traffic and queue rates.
    pub unit: RateUnit,
    /// Maximum number of liveness probes in flight at once.
    pub probe_concurrency: usize,
    /// Name of the bridge aggregate interface.
    pub bridge_interface: String,
}

impl ControllerConfig {
    /// A config with default tuning for the given router and credentials.
    pub fn new(url: Url, username: impl Into<String>, password: SecretString) -> Self {
        Self {
            url,
            username: username.into(),
            password,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(10),
            scan_interval: Duration::from_secs(30),
            firmware_check_interval: Duration::from_secs(3600),
            cycle_lock_timeout: Duration::from_secs(10),
            track_arp: true,
            track_hosts: true,
            unit: RateUnit::default(),
            probe_concurrency: 4,
            bridge_interface: "bridge".into(),
        }
    }
}
