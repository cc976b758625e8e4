mod cli;
mod commands;
mod config;
mod error;
mod output;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, GlobalOpts};
use crate::config::CliNavigator;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.global);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

/// `RUST_LOG` wins; otherwise `-v` raises the level and `-q` keeps only errors.
fn init_tracing(global: &GlobalOpts) {
    let level = match (global.quiet, global.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,huely={level},huely_core={level},huely_api={level},huely_config={level}"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(mut cli: Cli) -> Result<(), CliError> {
    let cfg = huely_config::load_config()?;
    cli.global.apply_defaults(&cfg);
    let global = &cli.global;

    match cli.command {
        // Config commands don't need a bridge
        Command::Config(args) => commands::config_cmd::handle(args, &cfg, global),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "huely", &mut std::io::stdout());
            Ok(())
        }

        cmd => {
            let navigator = Arc::new(CliNavigator::default());
            let hue = config::build_hue(global, &cfg, navigator.clone())?;

            tracing::debug!(command = ?cmd, "dispatching command");
            let result = commands::dispatch(cmd, &hue, global).await;

            // The core asks for a screen when the command can't proceed
            // without pairing or a primary group.
            match navigator.take() {
                Some(screen)
                    if commands::util::is_interactive(global)
                        && commands::util::confirm(commands::screen_prompt(screen), true)? =>
                {
                    if let Err(err) = &result {
                        eprintln!("{err}");
                    }
                    commands::open_screen(screen, &hue, global).await
                }
                _ => result,
            }
        }
    }
}
