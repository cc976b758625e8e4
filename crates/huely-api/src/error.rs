use std::time::Duration;

use thiserror::Error;

/// Hue error `type` for a request made with an unknown or revoked username.
pub const UNAUTHORIZED_USER: u16 = 1;

/// Hue error `type` for an id that names no light or group.
pub const RESOURCE_NOT_AVAILABLE: u16 = 3;

/// Hue error `type` returned by pairing when the link button was not pressed.
pub const LINK_BUTTON_NOT_PRESSED: u16 = 101;

/// Coarse classification of an [`Error`].
///
/// Callers render a distinct message per kind, so every variant maps to
/// exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum ErrorKind {
    /// Malformed input, rejected before any I/O.
    #[strum(to_string = "Validation Error")]
    Validation,
    /// Address or username missing; no request was attempted.
    #[strum(to_string = "Configuration Error")]
    Configuration,
    /// The bridge could not be reached, timed out, or answered non-2xx.
    #[strum(to_string = "Connection Error")]
    Connection,
    /// The bridge answered, but the body carries an error or is malformed.
    #[strum(to_string = "Bridge Error")]
    Bridge,
}

/// Top-level error type for the `huely-api` crate.
#[derive(Debug, Error)]
pub enum Error {
    // ── Validation ──────────────────────────────────────────────────
    /// Input rejected before any network call (bad address, bad id).
    #[error("{message}")]
    Validation { message: String },

    /// A path or base URL could not be assembled.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── Configuration ───────────────────────────────────────────────
    /// The client has no bridge address or no username.
    #[error("Bridge not configured. Please connect to a Hue Bridge first.")]
    NotConfigured,

    // ── Transport ───────────────────────────────────────────────────
    /// The bridge (or discovery endpoint) answered with a non-2xx status.
    #[error("{message}")]
    Connection { message: String, status: Option<u16> },

    /// Connection refused, DNS failure, reset, etc.
    #[error("HTTP transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The request was aborted after the per-call timeout.
    #[error("{operation} timed out")]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },

    // ── Bridge ──────────────────────────────────────────────────────
    /// Application error encoded in a 2xx body (`[{"error": {...}}]`).
    #[error("{message}")]
    Bridge { message: String, code: Option<u16> },

    /// A 2xx body that does not have the expected shape.
    #[error("{message}")]
    InvalidResponse { message: String, body: String },
}

impl Error {
    /// Shorthand for a [`Error::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Shorthand for a [`Error::Bridge`] without a code.
    pub fn bridge(message: impl Into<String>) -> Self {
        Self::Bridge {
            message: message.into(),
            code: None,
        }
    }

    /// Wrap a `reqwest` failure, turning timeouts into [`Error::Timeout`].
    ///
    /// The request URL is dropped since it carries the bridge username.
    pub(crate) fn from_reqwest(err: reqwest::Error, operation: &'static str, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout { operation, timeout }
        } else {
            Self::Transport(err.without_url())
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } | Self::InvalidUrl(_) => ErrorKind::Validation,
            Self::NotConfigured => ErrorKind::Configuration,
            Self::Connection { .. } | Self::Transport(_) | Self::Timeout { .. } => {
                ErrorKind::Connection
            }
            Self::Bridge { .. } | Self::InvalidResponse { .. } => ErrorKind::Bridge,
        }
    }

    /// Returns `true` if the request was aborted by the timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// The machine-readable Hue error `type`, if the bridge supplied one.
    pub fn bridge_code(&self) -> Option<u16> {
        match self {
            Self::Bridge { code, .. } => *code,
            _ => None,
        }
    }

    /// Returns `true` if the bridge rejected the stored username.
    pub fn is_unauthorized(&self) -> bool {
        self.bridge_code() == Some(UNAUTHORIZED_USER)
    }

    /// Returns `true` if pairing failed because the link button was not pressed.
    pub fn is_link_button_not_pressed(&self) -> bool {
        match self {
            Self::Bridge { code, message } => {
                *code == Some(LINK_BUTTON_NOT_PRESSED) || message.contains("link button not pressed")
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_distinct_per_family() {
        assert_eq!(Error::validation("bad").kind(), ErrorKind::Validation);
        assert_eq!(Error::NotConfigured.kind(), ErrorKind::Configuration);
        assert_eq!(
            Error::Timeout {
                operation: "API request",
                timeout: Duration::from_secs(10),
            }
            .kind(),
            ErrorKind::Connection
        );
        assert_eq!(Error::bridge("x").kind(), ErrorKind::Bridge);
    }

    #[test]
    fn timeout_message_names_the_operation() {
        let err = Error::Timeout {
            operation: "Bridge discovery",
            timeout: Duration::from_secs(10),
        };
        assert_eq!(err.to_string(), "Bridge discovery timed out");
    }

    #[test]
    fn link_button_detected_by_code_or_message() {
        let by_code = Error::Bridge {
            message: "whatever".into(),
            code: Some(LINK_BUTTON_NOT_PRESSED),
        };
        assert!(by_code.is_link_button_not_pressed());
        assert!(Error::bridge("link button not pressed").is_link_button_not_pressed());
        assert!(!Error::bridge("unauthorized user").is_link_button_not_pressed());
    }

    #[test]
    fn kind_display_matches_toast_titles() {
        assert_eq!(ErrorKind::Bridge.to_string(), "Bridge Error");
        assert_eq!(ErrorKind::Connection.to_string(), "Connection Error");
    }
}
