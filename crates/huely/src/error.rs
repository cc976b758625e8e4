//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use huely_config::ConfigError;
use huely_core::{CoreError, LINK_BUTTON_NOT_PRESSED, RESOURCE_NOT_AVAILABLE, UNAUTHORIZED_USER};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_CONFIGURED: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const BRIDGE: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Configuration ────────────────────────────────────────────────

    #[error("Bridge not configured. Please connect to a Hue Bridge first.")]
    #[diagnostic(
        code(huely::not_configured),
        help(
            "Press the link button on the bridge, then run: huely bridge connect\n\
             Config file: {path}"
        )
    )]
    NotConfigured { path: String },

    #[error("Invalid bridge configuration: {message}")]
    #[diagnostic(
        code(huely::invalid_configuration),
        help("Pair again with: huely bridge connect")
    )]
    InvalidConfiguration { message: String },

    #[error("No primary group selected")]
    #[diagnostic(
        code(huely::no_primary_group),
        help("Choose one with: huely primary select")
    )]
    NoPrimaryGroup,

    #[error("Could not save settings: {message}")]
    #[diagnostic(code(huely::storage))]
    Storage { message: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(huely::config))]
    Config { message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(huely::validation))]
    Validation { field: String, reason: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(huely::not_found),
        help("Run: huely {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("{message}")]
    #[diagnostic(
        code(huely::resource_unavailable),
        help("Check the id with: huely lights list / huely groups list --all")
    )]
    ResourceUnavailable { message: String },

    // ── Connection ───────────────────────────────────────────────────

    #[error("{message}")]
    #[diagnostic(
        code(huely::connection_failed),
        help(
            "Check that the bridge is powered on and on the same network.\n\
             If its address changed, run: huely bridge connect"
        )
    )]
    ConnectionFailed { message: String },

    #[error("{operation} timed out after {seconds}s")]
    #[diagnostic(
        code(huely::timeout),
        help("Increase the timeout with --timeout or check that the bridge is reachable.")
    )]
    Timeout { operation: String, seconds: u64 },

    // ── Bridge ───────────────────────────────────────────────────────

    #[error("{message}")]
    #[diagnostic(
        code(huely::unauthorized),
        help("The bridge no longer accepts the stored username. Pair again with: huely bridge connect")
    )]
    Unauthorized { message: String },

    #[error("{message}")]
    #[diagnostic(
        code(huely::link_button),
        help("Press the round link button on the bridge, then run the command again within 30 seconds.")
    )]
    LinkButtonNotPressed { message: String },

    #[error("{message}")]
    #[diagnostic(code(huely::bridge_error))]
    Bridge { message: String },

    // ── IO / Serialization ───────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotConfigured { .. }
            | Self::InvalidConfiguration { .. }
            | Self::NoPrimaryGroup => exit_code::NOT_CONFIGURED,
            Self::Validation { .. } => exit_code::USAGE,
            Self::NotFound { .. } | Self::ResourceUnavailable { .. } => exit_code::NOT_FOUND,
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Unauthorized { .. } | Self::LinkButtonNotPressed { .. } | Self::Bridge { .. } => {
                exit_code::BRIDGE
            }
            Self::Storage { .. } | Self::Config { .. } | Self::Io(_) => exit_code::GENERAL,
        }
    }
}

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Io(std::io::Error::other(e.to_string()))
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotConfigured => CliError::NotConfigured {
                path: huely_config::config_path().display().to_string(),
            },

            CoreError::InvalidConfiguration { message } => CliError::InvalidConfiguration { message },

            CoreError::NoPrimaryGroup => CliError::NoPrimaryGroup,

            CoreError::Storage { message } => CliError::Storage { message },

            CoreError::Validation { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::Connection { message, status: _ } => CliError::ConnectionFailed { message },

            CoreError::Timeout {
                operation,
                timeout_secs,
            } => CliError::Timeout {
                operation: operation.into(),
                seconds: timeout_secs,
            },

            CoreError::Bridge { message, code } => match code {
                Some(UNAUTHORIZED_USER) => CliError::Unauthorized { message },
                Some(LINK_BUTTON_NOT_PRESSED) => CliError::LinkButtonNotPressed { message },
                Some(RESOURCE_NOT_AVAILABLE) => CliError::ResourceUnavailable { message },
                _ => CliError::Bridge { message },
            },

            CoreError::InvalidResponse { message } => CliError::Bridge { message },

            CoreError::NotFound {
                entity_type,
                identifier,
            } => CliError::NotFound {
                list_command: format!("{entity_type}s list"),
                resource_type: entity_type.into(),
                identifier,
            },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            e @ ConfigError::UnknownKey { .. } => CliError::Validation {
                field: "key".into(),
                reason: e.to_string(),
            },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bridge_codes_pick_distinct_errors() {
        let err: CliError = CoreError::Bridge {
            message: "unauthorized user".into(),
            code: Some(1),
        }
        .into();
        assert!(matches!(err, CliError::Unauthorized { .. }));
        assert_eq!(err.exit_code(), exit_code::BRIDGE);

        let err: CliError = CoreError::Bridge {
            message: "resource, /lights/9, not available".into(),
            code: Some(3),
        }
        .into();
        assert_eq!(err.exit_code(), exit_code::NOT_FOUND);
    }

    #[test]
    fn families_map_to_exit_codes() {
        let cases = [
            (CoreError::NotConfigured, exit_code::NOT_CONFIGURED),
            (CoreError::NoPrimaryGroup, exit_code::NOT_CONFIGURED),
            (
                CoreError::Validation {
                    message: "Invalid IP address format".into(),
                },
                exit_code::USAGE,
            ),
            (
                CoreError::Connection {
                    message: "API request failed: Not Found".into(),
                    status: Some(404),
                },
                exit_code::CONNECTION,
            ),
            (
                CoreError::Timeout {
                    operation: "API request",
                    timeout_secs: 10,
                },
                exit_code::TIMEOUT,
            ),
        ];
        for (core, code) in cases {
            assert_eq!(CliError::from(core).exit_code(), code);
        }
    }
}
