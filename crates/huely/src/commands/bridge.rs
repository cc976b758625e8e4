//! Bridge command handlers: discovery, pairing, status.

use dialoguer::{Input, Select};
use tabled::Tabled;
use tracing::debug;

use huely_core::{BridgeStatus, CoreError, DiscoveredBridge, Hue, LINK_BUTTON_NOT_PRESSED};

use crate::cli::{BridgeArgs, BridgeCommand, GlobalOpts};
use crate::error::{CliError, prompt_err};
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct BridgeRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Port")]
    port: u16,
}

impl From<&DiscoveredBridge> for BridgeRow {
    fn from(b: &DiscoveredBridge) -> Self {
        Self {
            id: b.id.clone().unwrap_or_else(|| "-".into()),
            address: b.address.to_string(),
            port: b.port,
        }
    }
}

fn status_detail(s: &BridgeStatus) -> String {
    [
        format!("Address:       {}", s.address.as_deref().unwrap_or("-")),
        format!("Paired:        {}", if s.configured { "yes" } else { "no" }),
        format!("Primary group: {}", s.primary_group.as_deref().unwrap_or("-")),
    ]
    .join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(hue: &Hue, args: BridgeArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        BridgeCommand::Discover => {
            let bridges = discover(hue, global).await?;
            if bridges.is_empty() {
                output::status("No bridges found on the local network.", global.quiet);
                return Ok(());
            }
            let out = output::render_list(global.format(), &bridges, |b| BridgeRow::from(b), |b| {
                b.address.to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        BridgeCommand::Connect { address } => connect(hue, address, global).await,

        BridgeCommand::Disconnect => {
            hue.disconnect()?;
            output::status("Bridge disconnected.", global.quiet);
            Ok(())
        }

        BridgeCommand::Status => {
            let status = hue.status()?;
            let out = output::render_single(global.format(), &status, status_detail, |s| {
                s.address.clone().unwrap_or_default()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

async fn discover(hue: &Hue, global: &GlobalOpts) -> Result<Vec<DiscoveredBridge>, CliError> {
    let pb = util::spinner("Searching for bridges...", global);
    let result = hue.discover().await;
    pb.finish_and_clear();
    Ok(result?)
}

// ── Pairing ─────────────────────────────────────────────────────────

/// Pair with a bridge, asking for the address when none is given.
///
/// Interactive sessions get a retry prompt when the link button hasn't
/// been pressed yet.
pub async fn connect(hue: &Hue, address: Option<String>, global: &GlobalOpts) -> Result<(), CliError> {
    let interactive = util::is_interactive(global);
    let address = match address {
        Some(address) => address,
        None if interactive => choose_address(hue, global).await?,
        None => {
            return Err(CliError::Validation {
                field: "address".into(),
                reason: "a bridge address is required when not running interactively".into(),
            });
        }
    };

    loop {
        let pb = util::spinner(format!("Pairing with {address}..."), global);
        let result = hue.connect(&address).await;
        pb.finish_and_clear();

        match result {
            Ok(pairing) => {
                output::status(
                    &format!("Connected to bridge at {}.", pairing.address),
                    global.quiet,
                );
                return Ok(());
            }
            Err(CoreError::Bridge {
                code: Some(LINK_BUTTON_NOT_PRESSED),
                message,
            }) if interactive => {
                debug!(%message, "link button not pressed");
                eprintln!("Press the round link button on top of the bridge.");
                if !util::confirm("Pressed it? Try pairing again", true)? {
                    return Err(CoreError::Bridge {
                        code: Some(LINK_BUTTON_NOT_PRESSED),
                        message,
                    }
                    .into());
                }
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Offer discovered bridges plus a manual entry option.
async fn choose_address(hue: &Hue, global: &GlobalOpts) -> Result<String, CliError> {
    let bridges = match discover(hue, global).await {
        Ok(bridges) => bridges,
        Err(e) => {
            // Manual entry below still works.
            eprintln!("Bridge discovery failed: {e}");
            Vec::new()
        }
    };

    let mut items: Vec<String> = bridges
        .iter()
        .map(|b| match &b.id {
            Some(id) => format!("{} ({id})", b.address),
            None => b.address.to_string(),
        })
        .collect();
    items.push("Enter an address manually".into());

    let selection = Select::new()
        .with_prompt("Bridge")
        .items(&items)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    match bridges.get(selection) {
        Some(bridge) => Ok(bridge.address.to_string()),
        None => Input::<String>::new()
            .with_prompt("Bridge IP address")
            .interact_text()
            .map_err(prompt_err),
    }
}
