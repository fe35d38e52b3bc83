//! Simple queue command handlers.

use tabled::Tabled;
use tiksync_core::{Controller, Queue, RestClient};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct QueueRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Enabled")]
    enabled: &'static str,
    #[tabled(rename = "Max up")]
    max_up: String,
    #[tabled(rename = "Max down")]
    max_down: String,
    #[tabled(rename = "Rate up")]
    rate_up: String,
    #[tabled(rename = "Rate down")]
    rate_down: String,
    #[tabled(rename = "Burst time")]
    burst_time: String,
}

impl From<&Queue> for QueueRow {
    fn from(q: &Queue) -> Self {
        Self {
            name: q.name.clone(),
            target: q.target.clone(),
            enabled: output::yes_no(q.enabled),
            max_up: q.upload_max_limit.clone(),
            max_down: q.download_max_limit.clone(),
            rate_up: q.upload_rate.clone(),
            rate_down: q.download_rate.clone(),
            burst_time: q.burst_time.clone(),
        }
    }
}

pub fn handle(controller: &Controller<RestClient>, global: &GlobalOpts) -> Result<(), CliError> {
    let state = controller.snapshot();
    let queues: Vec<&Queue> = state.queues.values().collect();

    let out = output::render_list(
        &global.output,
        &queues,
        |q| QueueRow::from(*q),
        |q| q.name.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
