//! Light command handlers.

use tabled::Tabled;

use huely_core::{Hue, Keyed, Light, StatePatch};

use crate::cli::{GlobalOpts, LightsArgs, LightsCommand, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct LightRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Brightness")]
    brightness: String,
    #[tabled(rename = "Reachable")]
    reachable: String,
    #[tabled(rename = "Type")]
    light_type: String,
}

fn row(l: &Keyed<Light>, color: bool) -> LightRow {
    let light = &l.item;
    LightRow {
        id: l.id.clone(),
        name: light.name.clone(),
        state: output::power(light.state.on, color),
        brightness: light
            .brightness_percent()
            .map_or_else(|| "-".into(), |p| format!("{p}%")),
        reachable: if light.state.reachable {
            "yes".into()
        } else {
            output::warn("no", color)
        },
        light_type: light.light_type.clone(),
    }
}

fn detail(l: &Keyed<Light>) -> String {
    let light = &l.item;
    let state = &light.state;
    let mut lines = vec![
        format!("ID:           {}", l.id),
        format!("Name:         {}", light.name),
        format!("Type:         {}", light.light_type),
        format!("State:        {}", if state.on { "On" } else { "Off" }),
        format!("Reachable:    {}", if state.reachable { "yes" } else { "no" }),
    ];
    if let Some(bri) = state.bri {
        let pct = light.brightness_percent().unwrap_or_default();
        lines.push(format!("Brightness:   {bri} ({pct}%)"));
    }
    if let Some(mode) = &state.colormode {
        lines.push(format!("Color mode:   {mode}"));
    }
    if let (Some(hue), Some(sat)) = (state.hue, state.sat) {
        lines.push(format!("Hue/Sat:      {hue} / {sat}"));
    }
    if let Some([x, y]) = state.xy {
        lines.push(format!("XY:           {x:.4}, {y:.4}"));
    }
    if let Some(ct) = state.ct {
        lines.push(format!("Color temp:   {ct} mired"));
    }
    if let Some(model) = &light.model_id {
        lines.push(format!("Model:        {model}"));
    }
    if let Some(product) = &light.product_name {
        lines.push(format!("Product:      {product}"));
    }
    if let Some(sw) = &light.sw_version {
        lines.push(format!("Firmware:     {sw}"));
    }
    lines.join("\n")
}

fn render(format: OutputFormat, color: bool, lights: &[Keyed<Light>]) -> String {
    output::render_list(format, lights, |l| row(l, color), |l| l.id.clone())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(hue: &Hue, args: LightsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(global.color_mode());
    let format = global.format();

    match args.command {
        LightsCommand::List { watch: None } => {
            let lights = hue.lights().await?;
            output::print_output(&render(format, color, &lights), global.quiet);
            Ok(())
        }

        LightsCommand::List { watch: Some(secs) } => {
            // Fail fast on a missing bridge instead of redrawing the error.
            hue.lights().await?;
            let hue = hue.clone();
            util::watch(
                secs,
                move || {
                    let hue = hue.clone();
                    async move { hue.lights().await }
                },
                move |res| util::redraw(res.map(|lights| render(format, color, &lights))),
            )
            .await
        }

        LightsCommand::Get { id } => {
            let light = hue.light(&id).await?;
            let keyed = Keyed { id, item: light };
            let out = output::render_single(format, &keyed, detail, |l| l.id.clone());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        LightsCommand::On { id } => power(hue, &id, true, global).await,
        LightsCommand::Off { id } => power(hue, &id, false, global).await,

        LightsCommand::Toggle { id } => {
            let toggled = hue.toggle_light(&id).await?;
            output::status(
                &format!(
                    "{} turned {}",
                    toggled.name,
                    if toggled.on { "on" } else { "off" }
                ),
                global.quiet,
            );
            Ok(())
        }

        LightsCommand::Set { id, state } => {
            let patch = state.to_patch()?;
            let applied = hue.set_light_state(&id, &patch).await?;
            util::print_applied(&applied, global);
            Ok(())
        }
    }
}

async fn power(hue: &Hue, id: &str, on: bool, global: &GlobalOpts) -> Result<(), CliError> {
    hue.set_light_state(id, &StatePatch::power(on)).await?;
    output::status(
        &format!("Light {id} turned {}", if on { "on" } else { "off" }),
        global.quiet,
    );
    Ok(())
}
