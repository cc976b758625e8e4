//! Command dispatch: CLI args -> `Hue` facade calls -> output formatting.

pub mod bridge;
pub mod config_cmd;
pub mod groups;
pub mod lights;
pub mod primary;
pub mod util;

use huely_core::{Hue, Screen};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a bridge-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, hue: &Hue, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Bridge(args) => bridge::handle(hue, args, global).await,
        Command::Lights(args) => lights::handle(hue, args, global).await,
        Command::Groups(args) => groups::handle(hue, args, global).await,
        Command::Primary(args) => primary::handle(hue, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}

/// Run the interactive flow behind a screen the core asked for.
pub async fn open_screen(screen: Screen, hue: &Hue, global: &GlobalOpts) -> Result<(), CliError> {
    match screen {
        Screen::ConnectBridge => bridge::connect(hue, None, global).await,
        Screen::SelectPrimaryGroup => primary::select(hue, None, global).await,
    }
}

/// Question asked before opening `screen`.
pub fn screen_prompt(screen: Screen) -> &'static str {
    match screen {
        Screen::ConnectBridge => "Bridge not connected or not reachable. Pair with a bridge now?",
        Screen::SelectPrimaryGroup => "No primary group selected. Choose one now?",
    }
}
