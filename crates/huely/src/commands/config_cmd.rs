//! Config subcommand handlers.

use huely_config::{self as config, Config};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

/// Copy of `cfg` with the bridge username masked.
fn redacted(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    if cfg.bridge.username.is_some() {
        cfg.bridge.username = Some("****".into());
    }
    cfg
}

fn detail(cfg: &Config) -> String {
    toml::to_string_pretty(cfg)
        .unwrap_or_else(|e| format!("error: serialization failed: {e}"))
        .trim_end()
        .to_owned()
}

pub fn handle(args: ConfigArgs, cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let shown = redacted(cfg);
            let out = output::render_single(global.format(), &shown, detail, detail);
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }

        ConfigCommand::Set { key, value } => {
            // Edit the file as written, not the env-merged view.
            let path = config::config_path();
            let mut on_disk = config::load_file(&path)?;
            on_disk.set(&key, &value)?;
            config::save_config_to(&on_disk, &path)?;
            output::status(&format!("Set {key} = {value}"), global.quiet);
            Ok(())
        }
    }
}
