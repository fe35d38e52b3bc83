//! Config subcommand handlers.

use dialoguer::{Confirm, Input, Password, Select};
use tiksync_core::RateUnit;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str, expected: &str) -> Result<T, CliError> {
    value.parse().map_err(|_| CliError::Validation {
        field: key.into(),
        reason: format!("must be {expected}"),
    })
}

/// Apply `key = value` to a profile.
fn set_profile_key(profile: &mut Profile, key: &str, value: String) -> Result<(), CliError> {
    match key {
        "router" => profile.router = value,
        "username" => profile.username = value,
        "password" => profile.password = Some(value),
        "password_env" | "password-env" => profile.password_env = Some(value),
        "ca_cert" | "ca-cert" => profile.ca_cert = Some(value.into()),
        "verify_tls" | "verify-tls" => {
            profile.verify_tls = parse_value(key, &value, "'true' or 'false'")?;
        }
        "timeout" => profile.timeout = Some(parse_value(key, &value, "a number (seconds)")?),
        "scan_interval" | "scan-interval" => {
            profile.scan_interval = Some(parse_value(key, &value, "a number (seconds)")?);
        }
        "firmware_check_interval" | "firmware-check-interval" => {
            profile.firmware_check_interval =
                Some(parse_value(key, &value, "a number (seconds)")?);
        }
        "unit" => {
            let expected = format!("one of {}", RateUnit::names().join(", "));
            profile.unit = Some(parse_value::<RateUnit>(key, &value, &expected)?);
        }
        "track_arp" | "track-arp" => {
            profile.track_arp = Some(parse_value(key, &value, "'true' or 'false'")?);
        }
        "track_hosts" | "track-hosts" => {
            profile.track_hosts = Some(parse_value(key, &value, "'true' or 'false'")?);
        }
        "probe_concurrency" | "probe-concurrency" => {
            profile.probe_concurrency = Some(parse_value(key, &value, "a positive number")?);
        }
        "bridge_interface" | "bridge-interface" => profile.bridge_interface = Some(value),
        other => {
            return Err(CliError::Validation {
                field: other.into(),
                reason: format!(
                    "unknown config key '{other}'. Valid keys: router, username, password, \
                     password_env, ca_cert, verify_tls, timeout, scan_interval, \
                     firmware_check_interval, unit, track_arp, track_hosts, \
                     probe_concurrency, bridge_interface"
                ),
            });
        }
    }
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("tiksync configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            let router: String = Input::new()
                .with_prompt("Router URL")
                .default("https://192.168.88.1".into())
                .interact_text()
                .map_err(prompt_err)?;
            tiksync_config::parse_router_url(&router)?;

            let username: String = Input::new()
                .with_prompt("Username")
                .default("admin".into())
                .interact_text()
                .map_err(prompt_err)?;

            let password = Password::new()
                .with_prompt("Password")
                .interact()
                .map_err(prompt_err)?;

            let store_choices = &[
                "Store in system keyring (recommended)",
                "Save to config file (plaintext)",
            ];
            let store_selection = Select::new()
                .with_prompt("Where to store the password?")
                .items(store_choices)
                .default(0)
                .interact()
                .map_err(prompt_err)?;

            let mut profile = Profile::new(router);
            profile.username = username;
            if store_selection == 0 {
                config::store_password(&profile_name, &password)?;
                eprintln!("   ✓ Password stored in system keyring");
            } else {
                profile.password = Some(password);
            }

            profile.track_hosts = Some(
                Confirm::new()
                    .with_prompt("Track hosts and probe their liveness?")
                    .default(true)
                    .interact()
                    .map_err(prompt_err)?,
            );

            let mut cfg = config::load_config_or_default();
            cfg.profiles.insert(profile_name.clone(), profile);
            cfg.default_profile = Some(profile_name.clone());
            config::save_config(&cfg)?;

            eprintln!("\n✓ Configuration written to {}", config_path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Test it: tiksync system");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            let out = output::render_single(
                &global.output,
                &cfg,
                |c| format!("{c:#?}"),
                |_| "config".into(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);

            let profile = cfg
                .profiles
                .entry(profile_name.clone())
                .or_insert_with(|| Profile::new(String::new()));
            set_profile_key(profile, &key, value)?;

            config::save_config(&cfg)?;
            eprintln!("✓ Set {key} on profile '{profile_name}'");
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: tiksync config init");
            } else {
                let mut names: Vec<_> = cfg.profiles.keys().collect();
                names.sort();
                for name in names {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();
            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    name,
                    available: config::available_profiles(&cfg),
                });
            }

            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            eprintln!("✓ Default profile set to '{name}'");
            Ok(())
        }

        // ── SetPassword ─────────────────────────────────────────────
        ConfigCommand::SetPassword { profile } => {
            let cfg: Config = config::load_config_or_default();
            let profile_name = profile.unwrap_or_else(|| config::active_profile_name(global, &cfg));
            if !cfg.profiles.contains_key(&profile_name) {
                return Err(CliError::ProfileNotFound {
                    name: profile_name,
                    available: config::available_profiles(&cfg),
                });
            }

            let password = Password::new()
                .with_prompt(format!("Password for '{profile_name}'"))
                .interact()
                .map_err(prompt_err)?;
            config::store_password(&profile_name, &password)?;
            eprintln!("✓ Password stored in system keyring for '{profile_name}'");
            Ok(())
        }
    }
}
