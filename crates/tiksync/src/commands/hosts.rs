//! Host registry command handlers.

use tabled::Tabled;
use tiksync_core::{Controller, Host, RestClient};

use crate::cli::{GlobalOpts, HostsArgs};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct HostRow {
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Interface")]
    interface: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Up")]
    available: &'static str,
    #[tabled(rename = "Last seen")]
    last_seen: String,
}

impl From<&Host> for HostRow {
    fn from(h: &Host) -> Self {
        Self {
            mac: h.mac_address.clone(),
            name: h.host_name.clone(),
            address: h.address.clone(),
            interface: h.interface.clone(),
            source: h.source.to_string(),
            available: output::yes_no(h.available),
            last_seen: h
                .last_seen
                .map_or_else(|| "never".into(), |t| t.format("%Y-%m-%d %H:%M:%S").to_string()),
        }
    }
}

pub fn handle(
    controller: &Controller<RestClient>,
    args: &HostsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let state = controller.snapshot();
    let hosts: Vec<&Host> = state
        .hosts
        .values()
        .filter(|h| !args.available || h.available)
        .collect();

    let out = output::render_list(
        &global.output,
        &hosts,
        |h| HostRow::from(*h),
        |h| h.mac_address.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
