//! `set` handlers: typed writes back to the router.

use serde_json::Value;
use tiksync_core::{Command as CoreCommand, Controller, RestClient};

use crate::cli::{GlobalOpts, SetArgs, SetCommand};
use crate::commands::util;
use crate::error::CliError;

pub async fn handle(
    controller: &Controller<RestClient>,
    args: SetArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let (cmd, label) = match args.command {
        SetCommand::Interface { name, state } => {
            if !state.enabled()
                && !util::confirm(&format!("Disable interface '{name}'?"), global.yes)?
            {
                return Ok(());
            }
            let label = format!("interface '{name}'");
            (
                CoreCommand::SetInterfaceEnabled {
                    interface: name,
                    enabled: state.enabled(),
                },
                label,
            )
        }
        SetCommand::Nat { uniq_id, state } => {
            let label = format!("NAT rule '{uniq_id}'");
            (
                CoreCommand::SetNatRuleEnabled {
                    uniq_id,
                    enabled: state.enabled(),
                },
                label,
            )
        }
        SetCommand::Queue { name, state } => {
            let label = format!("queue '{name}'");
            (
                CoreCommand::SetQueueEnabled {
                    name,
                    enabled: state.enabled(),
                },
                label,
            )
        }
        SetCommand::Value {
            path,
            match_field,
            match_value,
            field,
            value,
        } => {
            let label = format!("{field} on {path} where {match_field}={match_value}");
            (
                CoreCommand::SetValue {
                    path,
                    match_field,
                    match_value,
                    set_field: field,
                    value: Value::String(value),
                },
                label,
            )
        }
    };

    controller.execute(cmd).await?;
    if !global.quiet {
        eprintln!("✓ Updated {label}");
    }
    Ok(())
}
