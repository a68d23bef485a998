//! Command dispatch: bridges CLI args -> controller calls -> output.

pub mod config_cmd;
pub mod device;
pub mod profile;
pub mod run;

use cilia_core::Controller;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a device-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    controller: &Controller,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Light(args) => device::light(controller, args, global).await,
        Command::Fan(args) => device::fan(controller, args, global).await,
        Command::Scent(args) => device::scent(controller, args, global).await,
        Command::Profile(args) => profile::handle(controller, args, global).await,
        Command::Run(args) => run::handle(controller, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
