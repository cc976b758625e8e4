//! Clap derive structures for the `huely` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// huely -- Philips Hue from the terminal
#[derive(Debug, Parser)]
#[command(
    name = "huely",
    version,
    about = "Control Philips Hue lights and groups from the command line",
    long_about = "Talks to a Philips Hue bridge on the local network over its REST API.\n\n\
        Pair once with `huely bridge connect`, then list and switch lights and\n\
        groups, or toggle a primary group with a single command.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Bridge IP address (overrides the stored one)
    #[arg(long, short = 'b', env = "HUELY_BRIDGE", global = true)]
    pub bridge: Option<String>,

    /// Bridge username (overrides the stored one)
    #[arg(long, env = "HUELY_USERNAME", global = true, hide_env_values = true)]
    pub username: Option<String>,

    /// Output format [default: table]
    #[arg(long, short = 'o', env = "HUELY_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output [default: auto]
    #[arg(long, env = "HUELY_COLOR", global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds [default: 10]
    #[arg(long, env = "HUELY_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Discover, pair with, and forget bridges
    #[command(alias = "br")]
    Bridge(BridgeArgs),

    /// List and control lights
    #[command(alias = "light", alias = "l")]
    Lights(LightsArgs),

    /// List and control groups (rooms and zones)
    #[command(alias = "group", alias = "g")]
    Groups(GroupsArgs),

    /// Show, pick, or toggle the primary group
    #[command(alias = "p")]
    Primary(PrimaryArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Bridge ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct BridgeArgs {
    #[command(subcommand)]
    pub command: BridgeCommand,
}

#[derive(Debug, Subcommand)]
pub enum BridgeCommand {
    /// Find bridges on the local network
    Discover,

    /// Pair with a bridge (press its link button first)
    Connect {
        /// Bridge IP address; offers discovered bridges when omitted
        address: Option<String>,
    },

    /// Forget the stored bridge address and username
    Disconnect,

    /// Show the stored bridge connection
    Status,
}

// ── Shared state flags ───────────────────────────────────────────────

/// Partial state for `lights set` and `groups set`. Omitted flags are left
/// untouched on the bridge.
#[derive(Debug, Default, Args)]
pub struct StateArgs {
    /// Switch on
    #[arg(long, conflicts_with = "off")]
    pub on: bool,

    /// Switch off
    #[arg(long)]
    pub off: bool,

    /// Brightness (1-254)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=254))]
    pub bri: Option<u8>,

    /// Hue (0-65535)
    #[arg(long)]
    pub hue: Option<u16>,

    /// Saturation (0-254)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=254))]
    pub sat: Option<u8>,

    /// Color temperature in mireds (153-500)
    #[arg(long, value_parser = clap::value_parser!(u16).range(153..=500))]
    pub ct: Option<u16>,

    /// CIE color coordinates, e.g. 0.32,0.33
    #[arg(long, value_name = "X,Y", value_delimiter = ',', num_args = 2)]
    pub xy: Option<Vec<f64>>,

    /// Dynamic effect
    #[arg(long)]
    pub effect: Option<Effect>,

    /// Alert effect
    #[arg(long)]
    pub alert: Option<Alert>,

    /// Transition time in multiples of 100ms
    #[arg(long, value_name = "DECISECONDS")]
    pub transition: Option<u16>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Effect {
    /// Stop any running effect
    None,
    /// Cycle through all hues
    Colorloop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Alert {
    /// Stop alerting
    None,
    /// One breathe cycle
    Select,
    /// Breathe cycles for 15 seconds
    Lselect,
}

// ── Lights ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LightsArgs {
    #[command(subcommand)]
    pub command: LightsCommand,
}

#[derive(Debug, Subcommand)]
pub enum LightsCommand {
    /// List all lights
    #[command(alias = "ls")]
    List {
        /// Refresh every SECS seconds until interrupted
        #[arg(long, short = 'w', value_name = "SECS")]
        watch: Option<u64>,
    },

    /// Show one light
    Get { id: String },

    /// Switch a light on
    On { id: String },

    /// Switch a light off
    Off { id: String },

    /// Flip a light's power state
    Toggle { id: String },

    /// Apply a partial state to a light
    Set {
        id: String,
        #[command(flatten)]
        state: StateArgs,
    },
}

// ── Groups ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GroupsArgs {
    #[command(subcommand)]
    pub command: GroupsCommand,
}

#[derive(Debug, Subcommand)]
pub enum GroupsCommand {
    /// List groups with two or more lights
    #[command(alias = "ls")]
    List {
        /// Include single-light and empty groups
        #[arg(long, short = 'a')]
        all: bool,

        /// Refresh every SECS seconds until interrupted
        #[arg(long, short = 'w', value_name = "SECS")]
        watch: Option<u64>,
    },

    /// Show one group
    Get { id: String },

    /// Switch every light in a group on
    On { id: String },

    /// Switch every light in a group off
    Off { id: String },

    /// Switch a group off if any light is on, otherwise on
    Toggle { id: String },

    /// Apply a partial state to a whole group
    Set {
        id: String,
        #[command(flatten)]
        state: StateArgs,
    },
}

// ── Primary group ────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PrimaryArgs {
    #[command(subcommand)]
    pub command: PrimaryCommand,
}

#[derive(Debug, Subcommand)]
pub enum PrimaryCommand {
    /// Show the primary group
    Show,

    /// Choose the primary group
    Select {
        /// Group id; prompts with the group list when omitted
        id: Option<String>,
    },

    /// Toggle the primary group
    Toggle,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,

    /// Print the config file path
    Path,

    /// Set a configuration value (e.g. defaults.output json)
    Set { key: String, value: String },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
