//! Configuration for tiksync.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext),
//! and translation to `tiksync_core::ControllerConfig`. The CLI layers
//! its flag overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use tiksync_core::{ControllerConfig, RateUnit, TlsVerification};

const KEYRING_SERVICE: &str = "tiksync";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{name}' not found")]
    UnknownProfile { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named router profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Look up a profile by name.
    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Seconds between update cycles.
    #[serde(default = "default_scan_interval")]
    pub scan_interval: u64,

    /// Display unit for rates.
    #[serde(default)]
    pub unit: RateUnit,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
            scan_interval: default_scan_interval(),
            unit: RateUnit::default(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    10
}
fn default_scan_interval() -> u64 {
    30
}
fn default_username() -> String {
    "admin".into()
}

/// A named router profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Router base URL (e.g., "https://192.168.88.1").
    pub router: String,

    #[serde(default = "default_username")]
    pub username: String,

    /// Password (plaintext; prefer keyring or env var).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Verify the router certificate against the system store.
    #[serde(default)]
    pub verify_tls: bool,

    /// Override timeout (seconds).
    pub timeout: Option<u64>,

    /// Override scan interval (seconds).
    pub scan_interval: Option<u64>,

    /// Seconds between firmware update checks.
    pub firmware_check_interval: Option<u64>,

    /// Override display unit.
    pub unit: Option<RateUnit>,

    pub track_arp: Option<bool>,
    pub track_hosts: Option<bool>,
    pub probe_concurrency: Option<usize>,

    /// Name of the bridge aggregate interface.
    pub bridge_interface: Option<String>,
}

impl Profile {
    /// A profile for `router` with everything else defaulted.
    pub fn new(router: impl Into<String>) -> Self {
        Self {
            router: router.into(),
            username: default_username(),
            password: None,
            password_env: None,
            ca_cert: None,
            verify_tls: false,
            timeout: None,
            scan_interval: None,
            firmware_check_interval: None,
            unit: None,
            track_arp: None,
            track_hosts: None,
            probe_concurrency: None,
            bridge_interface: None,
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("io", "tiksync", "tiksync").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("tiksync");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the Config from `path`, merged with `TIKSYNC_*` variables
/// (`TIKSYNC_DEFAULTS__UNIT=Mbps`). A missing file yields the defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("TIKSYNC_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(&config_path(), cfg)
}

pub fn save_config_to(path: &Path, cfg: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password"))
}

/// Store a profile's password in the system keyring.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(password)?;
    Ok(())
}

/// Resolve the router password without CLI flags.
///
/// Order: the profile's `password_env`, `TIKSYNC_PASSWORD`, the system
/// keyring, the plaintext value in the profile.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    resolve_password_with(
        profile,
        profile_name,
        |name| std::env::var(name).ok(),
        |name| keyring_entry(name).and_then(|e| e.get_password()).ok(),
    )
}

fn resolve_password_with(
    profile: &Profile,
    profile_name: &str,
    env: impl Fn(&str) -> Option<String>,
    keyring: impl Fn(&str) -> Option<String>,
) -> Result<SecretString, ConfigError> {
    // 1. Env vars
    let from_env = profile
        .password_env
        .as_deref()
        .and_then(&env)
        .or_else(|| env("TIKSYNC_PASSWORD"));
    if let Some(pw) = from_env {
        return Ok(SecretString::from(pw));
    }

    // 2. Keyring
    if let Some(pw) = keyring(profile_name) {
        return Ok(SecretString::from(pw));
    }

    // 3. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Parse a router URL, accepting a bare host (`192.168.88.1`) as HTTPS.
pub fn parse_router_url(raw: &str) -> Result<url::Url, ConfigError> {
    let candidate = if raw.contains("://") {
        raw.to_owned()
    } else {
        format!("https://{raw}")
    };
    candidate.parse().map_err(|_| ConfigError::Validation {
        field: "router".into(),
        reason: format!("invalid URL: {raw}"),
    })
}

/// Build a `ControllerConfig` from a profile, no CLI flag overrides.
pub fn profile_to_controller_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ControllerConfig, ConfigError> {
    let url = parse_router_url(&profile.router)?;
    let password = resolve_password(profile, profile_name)?;
    Ok(apply_profile(
        ControllerConfig::new(url, profile.username.clone(), password),
        profile,
        defaults,
    ))
}

/// Overlay a profile's tuning on `config`.
pub fn apply_profile(
    mut config: ControllerConfig,
    profile: &Profile,
    defaults: &Defaults,
) -> ControllerConfig {
    config.tls = if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else if profile.verify_tls {
        TlsVerification::SystemDefaults
    } else {
        TlsVerification::DangerAcceptInvalid // RouterOS ships self-signed
    };

    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    config.scan_interval =
        Duration::from_secs(profile.scan_interval.unwrap_or(defaults.scan_interval));
    if let Some(secs) = profile.firmware_check_interval {
        config.firmware_check_interval = Duration::from_secs(secs);
    }
    config.unit = profile.unit.unwrap_or(defaults.unit);
    if let Some(track_arp) = profile.track_arp {
        config.track_arp = track_arp;
    }
    if let Some(track_hosts) = profile.track_hosts {
        config.track_hosts = track_hosts;
    }
    if let Some(n) = profile.probe_concurrency {
        config.probe_concurrency = n.max(1);
    }
    if let Some(ref bridge) = profile.bridge_interface {
        config.bridge_interface.clone_from(bridge);
    }
    config
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    const SAMPLE: &str = r#"
default_profile = "home"

[defaults]
output = "json"
unit = "Mbps"

[profiles.home]
router = "https://192.168.88.1"
username = "monitor"
password = "hunter2"
track_hosts = false
scan_interval = 15

[profiles.office]
router = "10.0.0.1"
ca_cert = "/etc/ssl/office-ca.pem"
"#;

    fn no_lookup(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn loads_profiles_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, SAMPLE).unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.default_profile.as_deref(), Some("home"));
        assert_eq!(config.defaults.output, "json");
        assert_eq!(config.defaults.unit, RateUnit::Mbps);
        assert_eq!(config.defaults.timeout, 10);

        let home = config.profile("home").unwrap();
        assert_eq!(home.username, "monitor");
        assert_eq!(home.track_hosts, Some(false));
        assert_eq!(config.profile("office").unwrap().username, "admin");
        assert!(matches!(
            config.profile("lab"),
            Err(ConfigError::UnknownProfile { .. })
        ));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(config.default_profile.as_deref(), Some("default"));
        assert!(config.profiles.is_empty());
        assert_eq!(config.defaults.scan_interval, 30);
    }

    #[test]
    fn save_then_load_keeps_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        let mut profile = Profile::new("https://router.lan");
        profile.unit = Some(RateUnit::KilobytesPerSec);
        config.profiles.insert("default".into(), profile);
        save_config_to(&path, &config).unwrap();

        let loaded = load_config_from(&path).unwrap();
        let profile = loaded.profile("default").unwrap();
        assert_eq!(profile.router, "https://router.lan");
        assert_eq!(profile.unit, Some(RateUnit::KilobytesPerSec));
    }

    #[test]
    fn password_prefers_env_then_keyring_then_plaintext() {
        let mut profile = Profile::new("192.168.88.1");
        profile.password = Some("plain".into());
        profile.password_env = Some("HOME_ROUTER_PW".into());

        let env = |name: &str| (name == "HOME_ROUTER_PW").then(|| "from-env".to_owned());
        let keyring = |name: &str| (name == "home").then(|| "from-keyring".to_owned());

        let pw = resolve_password_with(&profile, "home", env, keyring).unwrap();
        assert_eq!(pw.expose_secret(), "from-env");

        let pw = resolve_password_with(&profile, "home", no_lookup, keyring).unwrap();
        assert_eq!(pw.expose_secret(), "from-keyring");

        let pw = resolve_password_with(&profile, "home", no_lookup, no_lookup).unwrap();
        assert_eq!(pw.expose_secret(), "plain");

        profile.password = None;
        assert!(matches!(
            resolve_password_with(&profile, "home", no_lookup, no_lookup),
            Err(ConfigError::NoCredentials { .. })
        ));
    }

    #[test]
    fn bare_host_becomes_https() {
        assert_eq!(
            parse_router_url("192.168.88.1").unwrap().as_str(),
            "https://192.168.88.1/"
        );
        assert_eq!(
            parse_router_url("http://router.lan:8080").unwrap().as_str(),
            "http://router.lan:8080/"
        );
        assert!(parse_router_url("https://").is_err());
    }

    #[test]
    fn profile_overrides_controller_tuning() {
        let mut profile = Profile::new("192.168.88.1");
        profile.ca_cert = Some(PathBuf::from("/etc/ssl/ca.pem"));
        profile.scan_interval = Some(15);
        profile.track_arp = Some(false);
        profile.probe_concurrency = Some(0);
        profile.bridge_interface = Some("br-lan".into());

        let defaults = Defaults {
            unit: RateUnit::Kbps,
            ..Defaults::default()
        };
        let base = ControllerConfig::new(
            parse_router_url(&profile.router).unwrap(),
            "admin",
            SecretString::from("pw".to_owned()),
        );
        let config = apply_profile(base, &profile, &defaults);

        assert_eq!(
            config.tls,
            TlsVerification::CustomCa(PathBuf::from("/etc/ssl/ca.pem"))
        );
        assert_eq!(config.scan_interval, Duration::from_secs(15));
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.unit, RateUnit::Kbps);
        assert!(!config.track_arp);
        assert!(config.track_hosts);
        assert_eq!(config.probe_concurrency, 1);
        assert_eq!(config.bridge_interface, "br-lan");
    }
}
