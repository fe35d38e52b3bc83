//! Script command handlers.

use tabled::Tabled;
use tiksync_core::{Command as CoreCommand, Controller, RestClient, Script};

use crate::cli::{GlobalOpts, ScriptArgs, ScriptCommand};
use crate::commands::util::or_dash;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct ScriptRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Runs")]
    run_count: i64,
    #[tabled(rename = "Last started")]
    last_started: String,
    #[tabled(rename = "Comment")]
    comment: String,
}

impl From<&Script> for ScriptRow {
    fn from(s: &Script) -> Self {
        Self {
            name: s.name.clone(),
            run_count: s.run_count,
            last_started: s.last_started.clone(),
            comment: or_dash(&s.comment),
        }
    }
}

pub async fn handle(
    controller: &Controller<RestClient>,
    args: ScriptArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ScriptCommand::List => {
            let state = controller.snapshot();
            let scripts: Vec<&Script> = state.scripts.values().collect();
            let out = output::render_list(
                &global.output,
                &scripts,
                |s| ScriptRow::from(*s),
                |s| s.name.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
        ScriptCommand::Run { name } => {
            controller
                .execute(CoreCommand::RunScript { name: name.clone() })
                .await?;
            if !global.quiet {
                eprintln!("✓ Started script '{name}'");
            }
            Ok(())
        }
    }
}
