//! System info handler: resources, routerboard, firmware.

use std::fmt::Write as _;

use owo_colors::OwoColorize;
use serde::Serialize;
use tiksync_core::{Controller, FirmwareUpdate, Resource, RestClient, Routerboard};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct SystemInfo<'a> {
    resource: &'a Resource,
    routerboard: &'a Routerboard,
    firmware: &'a FirmwareUpdate,
}

fn detail(info: &SystemInfo<'_>, color: bool) -> String {
    let r = info.resource;
    let rb = info.routerboard;
    let fw = info.firmware;

    let rows = [
        ("Board", r.board_name.clone()),
        ("Model", rb.model.clone()),
        ("Serial", rb.serial_number.clone()),
        ("Platform", r.platform.clone()),
        ("Version", r.version.clone()),
        ("Firmware", rb.firmware.clone()),
        ("Uptime", r.uptime.clone()),
        ("CPU load", format!("{}%", r.cpu_load)),
        ("Memory", format!("{}%", r.memory_usage)),
        ("Disk", format!("{}%", r.hdd_usage)),
        ("Channel", fw.channel.clone()),
        ("Latest", fw.latest_version.clone()),
    ];

    let mut out = String::new();
    for (label, value) in rows {
        let label = format!("{label:<10}");
        if color {
            let _ = writeln!(out, "{} {value}", label.bold());
        } else {
            let _ = writeln!(out, "{label} {value}");
        }
    }

    let update = if fw.available {
        format!("update available: {}", fw.latest_version)
    } else {
        fw.status.clone()
    };
    if color && fw.available {
        let _ = write!(out, "{}", update.yellow());
    } else {
        out.push_str(&update);
    }
    out
}

pub fn handle(controller: &Controller<RestClient>, global: &GlobalOpts) -> Result<(), CliError> {
    let state = controller.snapshot();
    let info = SystemInfo {
        resource: &state.resource,
        routerboard: &state.routerboard,
        firmware: &state.firmware,
    };
    let color = output::should_color(&global.color);

    let out = output::render_single(
        &global.output,
        &info,
        |i| detail(i, color),
        |i| i.resource.version.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
