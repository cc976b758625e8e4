//! Rendering for `--output`.
//!
//! Lights and groups go through `render_list` / `render_single`; the table
//! form is for people, `plain` prints ids for shell pipelines.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::{ColorMode, OutputFormat};

// ── Color helpers ────────────────────────────────────────────────────

/// `auto` colors only an interactive stdout, and honours `NO_COLOR`.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
    }
}

/// "On" in green or "Off" dimmed.
pub fn power(on: bool, color: bool) -> String {
    match (on, color) {
        (true, true) => "On".green().bold().to_string(),
        (false, true) => "Off".dimmed().to_string(),
        (true, false) => "On".into(),
        (false, false) => "Off".into(),
    }
}

/// Group state label, colored by how many members are on.
pub fn group_state(label: &'static str, all_on: bool, any_on: bool, color: bool) -> String {
    if !color {
        return label.into();
    }
    if all_on {
        label.green().bold().to_string()
    } else if any_on {
        label.yellow().to_string()
    } else {
        label.dimmed().to_string()
    }
}

/// Warn-colored text for unreachable lights.
pub fn warn(text: &str, color: bool) -> String {
    if color {
        text.red().to_string()
    } else {
        text.into()
    }
}

// ── Renderers ────────────────────────────────────────────────────────

/// Render a collection. `to_row` builds the table row, `id_fn` the line
/// printed in `plain` mode; JSON and YAML serialize `data` itself.
pub fn render_list<T, R>(
    format: OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            render_table(&rows)
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => data.iter().map(&id_fn).collect::<Vec<_>>().join("\n"),
    }
}

/// Render one item. In table mode `detail_fn` supplies a key/value block.
pub fn render_single<T>(
    format: OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Table => detail_fn(data),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => id_fn(data),
    }
}

/// Write rendered output to stdout unless `-q` was given.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

/// Print a status line to stderr, respecting quiet mode.
pub fn status(message: &str, quiet: bool) {
    if !quiet {
        eprintln!("{message}");
    }
}

/// Clear the terminal before a `--watch` redraw.
pub fn clear_screen() {
    if io::stdout().is_terminal() {
        let mut stdout = io::stdout().lock();
        let _ = write!(stdout, "\x1b[2J\x1b[H");
    }
}

// ── Formats ──────────────────────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> String {
    let rendered = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    rendered.unwrap_or_else(|e| format!("{{\"error\": \"serialization failed: {e}\"}}"))
}

fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_yaml::to_string(data).unwrap_or_else(|e| format!("error: serialization failed: {e}"))
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    use super::*;

    #[derive(Serialize)]
    struct Item {
        id: String,
        name: String,
    }

    #[derive(Tabled)]
    struct ItemRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Name")]
        name: String,
    }

    fn items() -> Vec<Item> {
        vec![
            Item {
                id: "1".into(),
                name: "Kitchen".into(),
            },
            Item {
                id: "2".into(),
                name: "Hall".into(),
            },
        ]
    }

    fn row(i: &Item) -> ItemRow {
        ItemRow {
            id: i.id.clone(),
            name: i.name.clone(),
        }
    }

    #[test]
    fn plain_lists_one_id_per_line() {
        let out = render_list(OutputFormat::Plain, &items(), row, |i| i.id.clone());
        assert_eq!(out, "1\n2");
    }

    #[test]
    fn compact_json_is_single_line() {
        let out = render_list(OutputFormat::JsonCompact, &items(), row, |i| i.id.clone());
        assert_eq!(out, r#"[{"id":"1","name":"Kitchen"},{"id":"2","name":"Hall"}]"#);
    }

    #[test]
    fn table_has_headers() {
        let out = render_list(OutputFormat::Table, &items(), row, |i| i.id.clone());
        assert!(out.contains("ID"));
        assert!(out.contains("Kitchen"));
    }

    #[test]
    fn power_without_color_is_plain() {
        assert_eq!(power(true, false), "On");
        assert_eq!(power(false, false), "Off");
    }
}
