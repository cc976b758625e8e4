//! Group command handlers.

use tabled::Tabled;

use huely_core::{Group, GroupToggle, Hue, Keyed, StatePatch};

use crate::cli::{GlobalOpts, GroupsArgs, GroupsCommand, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct GroupRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Lights")]
    lights: usize,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Type")]
    kind: String,
}

fn row(g: &Keyed<Group>, color: bool) -> GroupRow {
    let group = &g.item;
    GroupRow {
        id: g.id.clone(),
        name: group.name.clone(),
        lights: group.lights.len(),
        state: output::group_state(
            group.state_label(),
            group.state.all_on,
            group.state.any_on,
            color,
        ),
        kind: match &group.class {
            Some(class) => format!("{} ({class})", group.group_type),
            None => group.group_type.clone(),
        },
    }
}

fn detail(g: &Keyed<Group>) -> String {
    let group = &g.item;
    let mut lines = vec![
        format!("ID:       {}", g.id),
        format!("Name:     {}", group.name),
        format!("Type:     {}", group.group_type),
    ];
    if let Some(class) = &group.class {
        lines.push(format!("Class:    {class}"));
    }
    lines.push(format!("State:    {}", group.state_label()));
    lines.push(format!("Lights:   {}", group.lights.join(", ")));
    if let Some(bri) = group.action.bri {
        lines.push(format!("Last bri: {bri}"));
    }
    lines.join("\n")
}

fn render(format: OutputFormat, color: bool, groups: &[Keyed<Group>]) -> String {
    output::render_list(format, groups, |g| row(g, color), |g| g.id.clone())
}

/// Report a toggle; `None` means no bridge was configured.
pub(super) fn report_toggle(toggled: Option<GroupToggle>, global: &GlobalOpts) -> Result<(), CliError> {
    let Some(toggled) = toggled else {
        return Err(CliError::NotConfigured {
            path: huely_config::config_path().display().to_string(),
        });
    };
    output::status(
        &format!(
            "{} turned {}",
            toggled.name,
            if toggled.on { "on" } else { "off" }
        ),
        global.quiet,
    );
    output::status(&format!("Next: {}", toggled.next_action()), global.quiet);
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(hue: &Hue, args: GroupsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(global.color_mode());
    let format = global.format();

    match args.command {
        GroupsCommand::List { all, watch: None } => {
            let groups = fetch(hue, all).await?;
            output::print_output(&render(format, color, &groups), global.quiet);
            Ok(())
        }

        GroupsCommand::List {
            all,
            watch: Some(secs),
        } => {
            fetch(hue, all).await?;
            let hue = hue.clone();
            util::watch(
                secs,
                move || {
                    let hue = hue.clone();
                    async move { fetch(&hue, all).await }
                },
                move |res| util::redraw(res.map(|groups| render(format, color, &groups))),
            )
            .await
        }

        GroupsCommand::Get { id } => {
            let group = hue.group(&id).await?;
            let keyed = Keyed { id, item: group };
            let out = output::render_single(format, &keyed, detail, |g| g.id.clone());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        GroupsCommand::On { id } => power(hue, &id, true, global).await,
        GroupsCommand::Off { id } => power(hue, &id, false, global).await,

        GroupsCommand::Toggle { id } => report_toggle(hue.toggle_group(&id).await?, global),

        GroupsCommand::Set { id, state } => {
            let patch = state.to_patch()?;
            let applied = hue.set_group_action(&id, &patch).await?;
            util::print_applied(&applied, global);
            Ok(())
        }
    }
}

async fn fetch(hue: &Hue, all: bool) -> Result<Vec<Keyed<Group>>, huely_core::CoreError> {
    if all {
        hue.all_groups().await
    } else {
        hue.groups().await
    }
}

async fn power(hue: &Hue, id: &str, on: bool, global: &GlobalOpts) -> Result<(), CliError> {
    hue.set_group_action(id, &StatePatch::power(on)).await?;
    output::status(
        &format!("Group {id} turned {}", if on { "on" } else { "off" }),
        global.quiet,
    );
    Ok(())
}
