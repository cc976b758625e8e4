//! Primary group handlers.

use dialoguer::Select;
use serde::Serialize;

use huely_core::Hue;

use crate::cli::{GlobalOpts, PrimaryArgs, PrimaryCommand};
use crate::error::{CliError, prompt_err};
use crate::output;

use super::{groups, util};

#[derive(Serialize)]
struct PrimaryView {
    id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

fn detail(v: &PrimaryView) -> String {
    match (&v.id, &v.name) {
        (Some(id), Some(name)) => format!("{name} (group {id})"),
        (Some(id), None) => format!("group {id}"),
        (None, _) => "No primary group selected".into(),
    }
}

pub async fn handle(hue: &Hue, args: PrimaryArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        PrimaryCommand::Show => {
            let id = hue.primary_group()?;
            // Only look the name up when a bridge is paired.
            let name = match &id {
                Some(id) if hue.status()?.configured => Some(hue.group(id).await?.name),
                _ => None,
            };
            let view = PrimaryView { id, name };
            let out = output::render_single(global.format(), &view, detail, |v| {
                v.id.clone().unwrap_or_default()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        PrimaryCommand::Select { id } => select(hue, id, global).await,

        PrimaryCommand::Toggle => groups::report_toggle(hue.toggle_primary_group().await?, global),
    }
}

/// Store the primary group, prompting with the group list when `id` is
/// `None`.
pub async fn select(hue: &Hue, id: Option<String>, global: &GlobalOpts) -> Result<(), CliError> {
    let id = match id {
        Some(id) => id,
        None if util::is_interactive(global) => {
            let groups = hue.groups().await?;
            if groups.is_empty() {
                return Err(CliError::Validation {
                    field: "group".into(),
                    reason: "the bridge has no groups with two or more lights".into(),
                });
            }
            let current = hue.primary_group()?;
            let default = current
                .as_deref()
                .and_then(|c| groups.iter().position(|g| g.id == c))
                .unwrap_or(0);
            let items: Vec<String> = groups
                .iter()
                .map(|g| format!("{} ({})", g.item.name, g.item.state_label()))
                .collect();
            let picked = Select::new()
                .with_prompt("Primary group")
                .items(&items)
                .default(default)
                .interact()
                .map_err(prompt_err)?;
            groups[picked].id.clone()
        }
        None => {
            return Err(CliError::Validation {
                field: "id".into(),
                reason: "a group id is required when not running interactively".into(),
            });
        }
    };

    let group = hue.select_primary_group(&id).await?;
    output::status(
        &format!("Primary group set to {} ({id}).", group.name),
        global.quiet,
    );
    Ok(())
}
