// ── Core error types ──
//
// User-facing errors from huely-core. The `From<huely_api::Error>` impl
// keeps the three error families (validation / connection / bridge)
// intact so front ends can render a distinct message for each.

use huely_api::{ErrorKind, error::UNAUTHORIZED_USER};
use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Configuration errors ─────────────────────────────────────────
    #[error("Bridge not configured. Please connect to a Hue Bridge first.")]
    NotConfigured,

    /// Stored settings exist but cannot be used (e.g. a corrupt address).
    #[error("Invalid bridge configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("No primary group selected")]
    NoPrimaryGroup,

    #[error("Storage error: {message}")]
    Storage { message: String },

    // ── Input errors ─────────────────────────────────────────────────
    #[error("{message}")]
    Validation { message: String },

    // ── Connection errors ────────────────────────────────────────────
    #[error("{message}")]
    Connection { message: String, status: Option<u16> },

    #[error("{operation} timed out after {timeout_secs}s")]
    Timeout {
        operation: &'static str,
        timeout_secs: u64,
    },

    // ── Bridge errors ────────────────────────────────────────────────
    #[error("{message}")]
    Bridge { message: String, code: Option<u16> },

    #[error("{message}")]
    InvalidResponse { message: String },

    #[error("{entity_type} '{identifier}' not found")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },
}

impl CoreError {
    pub fn storage(err: impl std::fmt::Display) -> Self {
        Self::Storage {
            message: err.to_string(),
        }
    }

    /// Classify this error into one of the families callers render.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotConfigured
            | Self::InvalidConfiguration { .. }
            | Self::NoPrimaryGroup
            | Self::Storage { .. } => ErrorKind::Configuration,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Connection { .. } | Self::Timeout { .. } => ErrorKind::Connection,
            Self::Bridge { .. } | Self::InvalidResponse { .. } | Self::NotFound { .. } => {
                ErrorKind::Bridge
            }
        }
    }

    /// Whether the user should be sent back to the connect screen.
    ///
    /// True for missing or unusable configuration, a rejected username,
    /// and an unreachable bridge.
    pub fn needs_reconnect(&self) -> bool {
        match self {
            Self::NotConfigured
            | Self::InvalidConfiguration { .. }
            | Self::Connection { .. }
            | Self::Timeout { .. } => true,
            Self::Bridge { code, .. } => *code == Some(UNAUTHORIZED_USER),
            _ => false,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<huely_api::Error> for CoreError {
    fn from(err: huely_api::Error) -> Self {
        match err {
            huely_api::Error::Validation { message } => Self::Validation { message },
            huely_api::Error::InvalidUrl(e) => Self::Validation {
                message: format!("Invalid URL: {e}"),
            },
            huely_api::Error::NotConfigured => Self::NotConfigured,
            huely_api::Error::Connection { message, status } => Self::Connection { message, status },
            huely_api::Error::Transport(e) => Self::Connection {
                message: format!("Bridge not reachable: {e}"),
                status: e.status().map(|s| s.as_u16()),
            },
            huely_api::Error::Timeout { operation, timeout } => Self::Timeout {
                operation,
                timeout_secs: timeout.as_secs(),
            },
            huely_api::Error::Bridge { message, code } => Self::Bridge { message, code },
            huely_api::Error::InvalidResponse { message, body: _ } => {
                Self::InvalidResponse { message }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn families_survive_conversion() {
        let cases = [
            (huely_api::Error::validation("bad"), ErrorKind::Validation),
            (huely_api::Error::NotConfigured, ErrorKind::Configuration),
            (
                huely_api::Error::Timeout {
                    operation: "API request",
                    timeout: Duration::from_secs(10),
                },
                ErrorKind::Connection,
            ),
            (huely_api::Error::bridge("x"), ErrorKind::Bridge),
        ];
        for (api, kind) in cases {
            assert_eq!(api.kind(), kind);
            assert_eq!(CoreError::from(api).kind(), kind);
        }
    }

    #[test]
    fn reconnect_policy() {
        assert!(CoreError::NotConfigured.needs_reconnect());
        assert!(
            CoreError::Connection {
                message: "API request failed: Internal Server Error".into(),
                status: Some(500),
            }
            .needs_reconnect()
        );
        assert!(
            CoreError::Bridge {
                message: "unauthorized user".into(),
                code: Some(UNAUTHORIZED_USER),
            }
            .needs_reconnect()
        );
        assert!(
            !CoreError::Bridge {
                message: "resource, /lights/99, not available".into(),
                code: Some(3),
            }
            .needs_reconnect()
        );
        assert!(!CoreError::NoPrimaryGroup.needs_reconnect());
    }

    #[test]
    fn bridge_message_is_preserved() {
        let err: CoreError = huely_api::Error::bridge("link button not pressed").into();
        assert_eq!(err.to_string(), "link button not pressed");
    }
}
