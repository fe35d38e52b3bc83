//! Interface command handlers.

use tabled::Tabled;
use tiksync_core::{Controller, Interface, RestClient};

use crate::cli::GlobalOpts;
use crate::commands::util::or_dash;
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
pub(crate) struct InterfaceRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Running")]
    running: &'static str,
    #[tabled(rename = "Enabled")]
    enabled: &'static str,
    #[tabled(rename = "Client IP")]
    client_ip: String,
    #[tabled(rename = "Client MAC")]
    client_mac: String,
    #[tabled(rename = "RX")]
    rx: String,
    #[tabled(rename = "TX")]
    tx: String,
}

impl From<&Interface> for InterfaceRow {
    fn from(i: &Interface) -> Self {
        Self {
            name: i.name.clone(),
            kind: i.kind.clone(),
            running: output::yes_no(i.running),
            enabled: output::yes_no(i.enabled),
            client_ip: or_dash(&i.client_ip_address),
            client_mac: or_dash(&i.client_mac_address),
            rx: or_dash(&i.rx_rate),
            tx: or_dash(&i.tx_rate),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(controller: &Controller<RestClient>, global: &GlobalOpts) -> Result<(), CliError> {
    let state = controller.snapshot();
    let interfaces: Vec<&Interface> = state.interfaces.values().collect();

    let out = output::render_list(
        &global.output,
        &interfaces,
        |i| InterfaceRow::from(*i),
        |i| i.name.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
