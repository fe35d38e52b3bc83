//! DHCP lease command handlers.

use tabled::Tabled;
use tiksync_core::{Controller, DhcpLease, RestClient, RouterState};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct LeaseRow {
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Host name")]
    host_name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Server")]
    server: String,
    #[tabled(rename = "Interface")]
    interface: String,
    #[tabled(rename = "Network")]
    network: String,
}

impl LeaseRow {
    fn new(lease: &DhcpLease, state: &RouterState) -> Self {
        Self {
            mac: lease.mac_address.clone(),
            address: lease.address.clone(),
            host_name: lease.host_name.clone(),
            status: lease.status.clone(),
            server: lease.server.clone(),
            interface: lease.interface.clone(),
            network: state
                .network_for(&lease.address)
                .map_or_else(|| "-".into(), |n| n.address.clone()),
        }
    }
}

pub fn handle(controller: &Controller<RestClient>, global: &GlobalOpts) -> Result<(), CliError> {
    let state = controller.snapshot();
    let leases: Vec<&DhcpLease> = state.dhcp_leases.values().collect();

    let out = output::render_list(
        &global.output,
        &leases,
        |l| LeaseRow::new(l, &state),
        |l| l.mac_address.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
