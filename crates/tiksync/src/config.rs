//! CLI configuration: thin wrapper around `tiksync_config` shared types.
//!
//! Re-exports the shared types and adds CLI-specific resolution that
//! respects `GlobalOpts` flag overrides (--router, --password, etc.).

use std::time::Duration;

use secrecy::SecretString;

use tiksync_core::{ControllerConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use tiksync_config::{
    Config, Profile, config_path, load_config_or_default, save_config, store_password,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Comma-separated profile names for diagnostics.
pub fn available_profiles(config: &Config) -> String {
    let mut names: Vec<_> = config.profiles.keys().cloned().collect();
    if names.is_empty() {
        return "(none)".into();
    }
    names.sort();
    names.join(", ")
}

/// Build a `ControllerConfig` from the config file, profile, and CLI
/// overrides. Without a profile, `--router` and `--password` must be given.
pub fn build_controller_config(global: &GlobalOpts) -> Result<ControllerConfig, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    if let Some(profile) = cfg.profiles.get(&profile_name) {
        return resolve_profile(profile, &profile_name, &cfg, global);
    }
    if global.profile.is_some() {
        return Err(CliError::ProfileNotFound {
            name: profile_name,
            available: available_profiles(&cfg),
        });
    }

    // No profile found -- try to build from CLI flags / env vars alone
    let router = global.router.as_deref().ok_or_else(|| CliError::NoConfig {
        path: config_path().display().to_string(),
    })?;
    let profile = Profile::new(router);
    resolve_profile(&profile, &profile_name, &cfg, global)
}

/// Translate a `Profile` + global flags into a `ControllerConfig`.
///
/// CLI flag overrides take priority over profile values.
pub fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    cfg: &Config,
    global: &GlobalOpts,
) -> Result<ControllerConfig, CliError> {
    // 1. Router URL (flag > env > profile)
    let router = global.router.as_deref().unwrap_or(&profile.router);
    let url = tiksync_config::parse_router_url(router)?;

    // 2. Credentials
    let username = global
        .username
        .clone()
        .unwrap_or_else(|| profile.username.clone());
    let password = match global.password {
        Some(ref pw) => SecretString::from(pw.clone()),
        None => tiksync_config::resolve_password(profile, profile_name)?,
    };

    // 3. Profile tuning, then flags
    let mut config = tiksync_config::apply_profile(
        ControllerConfig::new(url, username, password),
        profile,
        &cfg.defaults,
    );
    if global.verify_tls {
        config.tls = TlsVerification::SystemDefaults;
    }
    if let Some(secs) = global.timeout {
        config.timeout = Duration::from_secs(secs);
    }
    if let Some(unit) = global.unit {
        config.unit = unit;
    }
    Ok(config)
}
