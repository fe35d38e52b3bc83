//! `watch`: follow update cycles until interrupted.

use chrono::Local;
use futures_util::StreamExt;
use owo_colors::OwoColorize;
use tiksync_core::{Controller, Interface, RestClient, RouterState};

use crate::cli::{GlobalOpts, WatchArgs};
use crate::commands::interfaces::InterfaceRow;
use crate::error::CliError;
use crate::output;

/// One-line summary of a cycle.
fn summary(state: &RouterState) -> String {
    let up = state.hosts.values().filter(|h| h.available).count();
    format!(
        "{} interfaces, {}/{} hosts up, {} NAT rules, {} queues",
        state.interfaces.len(),
        up,
        state.hosts.len(),
        state.nat.len(),
        state.queues.len(),
    )
}

fn print_cycle(state: &RouterState, global: &GlobalOpts) -> Result<(), CliError> {
    if !global.quiet {
        let stamp = Local::now().format("%H:%M:%S").to_string();
        if output::should_color(&global.color) {
            eprintln!("{} {}", stamp.dimmed(), summary(state).bold());
        } else {
            eprintln!("{stamp} {}", summary(state));
        }
    }

    let interfaces: Vec<&Interface> = state.interfaces.values().collect();
    let out = output::render_list(
        &global.output,
        &interfaces,
        |i| InterfaceRow::from(*i),
        |i| format!("{} {} {}", i.name, i.rx_rate, i.tx_rate),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn handle(
    controller: &Controller<RestClient>,
    args: WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    // Yields the current snapshot first, then one per completed cycle.
    let mut updates = controller.subscribe().into_stream();

    let mut seen = 0;
    while args.count.is_none_or(|n| seen < n) {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            next = updates.next() => {
                let Some(state) = next else { break };
                print_cycle(&state, global)?;
                seen += 1;
            }
        }
    }
    Ok(())
}
