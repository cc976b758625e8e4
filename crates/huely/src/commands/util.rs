//! Shared helpers for command handlers.

use std::future::Future;
use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tabled::Tabled;

use huely_core::{Applied, CoreError, FetchGate, StatePatch};

use crate::cli::{Alert, Effect, GlobalOpts, StateArgs};
use crate::error::{CliError, prompt_err};
use crate::output;

/// Whether prompts can be shown: both ends are a terminal and `-q` is off.
pub fn is_interactive(global: &GlobalOpts) -> bool {
    !global.quiet && std::io::stdin().is_terminal() && std::io::stderr().is_terminal()
}

/// Prompt for confirmation.
pub fn confirm(message: &str, default: bool) -> Result<bool, CliError> {
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(default)
        .interact()
        .map_err(prompt_err)
}

/// Spinner on stderr while a slow call is in flight. Hidden with `-q`.
pub fn spinner(message: impl Into<String>, global: &GlobalOpts) -> ProgressBar {
    if global.quiet || !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.into());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

// ── State flags ─────────────────────────────────────────────────────

impl StateArgs {
    /// Build the partial state to send; fails if no flag was given.
    pub fn to_patch(&self) -> Result<StatePatch, CliError> {
        let on = match (self.on, self.off) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };
        let xy = match self.xy.as_deref() {
            None => None,
            Some(&[x, y]) if (0.0..=1.0).contains(&x) && (0.0..=1.0).contains(&y) => Some([x, y]),
            Some(_) => {
                return Err(CliError::Validation {
                    field: "xy".into(),
                    reason: "expected two coordinates between 0 and 1, e.g. 0.32,0.33".into(),
                });
            }
        };
        let patch = StatePatch {
            on,
            bri: self.bri,
            hue: self.hue,
            sat: self.sat,
            xy,
            ct: self.ct,
            alert: self.alert.map(|a| alert_name(a).to_owned()),
            effect: self.effect.map(|e| effect_name(e).to_owned()),
            transitiontime: self.transition,
        };
        if patch.is_empty() {
            return Err(CliError::Validation {
                field: "state".into(),
                reason: "nothing to set; pass at least one of --on, --off, --bri, --hue, --sat, \
                         --ct, --xy, --effect, --alert, --transition"
                    .into(),
            });
        }
        Ok(patch)
    }
}

fn alert_name(alert: Alert) -> &'static str {
    match alert {
        Alert::None => "none",
        Alert::Select => "select",
        Alert::Lselect => "lselect",
    }
}

fn effect_name(effect: Effect) -> &'static str {
    match effect {
        Effect::None => "none",
        Effect::Colorloop => "colorloop",
    }
}

// ── Applied changes ─────────────────────────────────────────────────

#[derive(Tabled)]
struct AppliedRow {
    #[tabled(rename = "Attribute")]
    path: String,
    #[tabled(rename = "Value")]
    value: String,
}

/// Print what the bridge reports as changed.
pub fn print_applied(applied: &[Applied], global: &GlobalOpts) {
    let out = output::render_list(
        global.format(),
        applied,
        |a| AppliedRow {
            path: a.path.clone(),
            value: a.value.to_string(),
        },
        |a| format!("{}={}", a.path, a.value),
    );
    output::print_output(&out, global.quiet);
}

// ── Watch mode ──────────────────────────────────────────────────────

/// Re-run `fetch` every `secs` seconds until Ctrl-C.
///
/// Each tick goes through a [`FetchGate`], so a tick that lands while the
/// previous fetch is still waiting on the bridge is dropped instead of
/// piling up requests.
pub async fn watch<T, F, Fut, R>(secs: u64, fetch: F, render: R) -> Result<(), CliError>
where
    T: Send + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, CoreError>> + Send + 'static,
    R: Fn(Result<T, CoreError>) + Send + Sync + 'static,
{
    let gate = Arc::new(FetchGate::default());
    let fetch = Arc::new(fetch);
    let render = Arc::new(render);
    let mut ticker = tokio::time::interval(Duration::from_secs(secs.max(1)));

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => return Ok(()),
            _ = ticker.tick() => {
                if gate.is_busy() {
                    tracing::debug!("previous refresh still running, skipping tick");
                    continue;
                }
                let (gate, fetch, render) = (gate.clone(), fetch.clone(), render.clone());
                tokio::spawn(async move {
                    if let Some(result) = gate.run(|| (*fetch)()).await {
                        (*render)(result);
                    }
                });
            }
        }
    }
}

/// Render one watch refresh: redraw on success, report errors in place.
pub fn redraw(out: Result<String, CoreError>) {
    match out {
        Ok(text) => {
            output::clear_screen();
            println!("{text}");
        }
        Err(err) => eprintln!("{:?}", miette::Report::new(CliError::from(err))),
    }
}
