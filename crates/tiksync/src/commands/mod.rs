//! Command dispatch: bridges CLI args -> core Commands -> output formatting.

pub mod config_cmd;
pub mod hosts;
pub mod interfaces;
pub mod leases;
pub mod nat;
pub mod queues;
pub mod script;
pub mod set;
pub mod system;
pub mod util;
pub mod watch;

use tiksync_core::{Controller, RestClient};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a router-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    controller: &Controller<RestClient>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Watch(args) => watch::handle(controller, args, global).await,
        Command::Interfaces => interfaces::handle(controller, global),
        Command::Hosts(args) => hosts::handle(controller, &args, global),
        Command::Nat => nat::handle(controller, global),
        Command::Queues => queues::handle(controller, global),
        Command::Leases => leases::handle(controller, global),
        Command::System => system::handle(controller, global),
        Command::Set(args) => set::handle(controller, args, global).await,
        Command::Script(args) => script::handle(controller, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
