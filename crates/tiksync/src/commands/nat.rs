//! NAT rule command handlers.

use tabled::Tabled;
use tiksync_core::{Controller, NatRule, RestClient};

use crate::cli::GlobalOpts;
use crate::commands::util::or_dash;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct NatRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "In")]
    in_interface: String,
    #[tabled(rename = "To")]
    to: String,
    #[tabled(rename = "Enabled")]
    enabled: &'static str,
    #[tabled(rename = "Comment")]
    comment: String,
}

impl From<&NatRule> for NatRow {
    fn from(r: &NatRule) -> Self {
        Self {
            name: r.name.clone(),
            in_interface: r.in_interface.clone(),
            to: format!("{}:{}", r.to_addresses, r.to_ports),
            enabled: output::yes_no(r.enabled),
            comment: or_dash(&r.comment),
        }
    }
}

pub fn handle(controller: &Controller<RestClient>, global: &GlobalOpts) -> Result<(), CliError> {
    let state = controller.snapshot();
    let rules: Vec<&NatRule> = state.nat.values().collect();

    // Plain output emits the identity string accepted by `set nat`.
    let out = output::render_list(
        &global.output,
        &rules,
        |r| NatRow::from(*r),
        |r| r.uniq_id.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
