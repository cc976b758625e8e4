// ── Navigation port ──
//
// When a call fails for lack of a usable bridge, the front end is asked to
// show its connect screen. How that happens (launch a command, print a
// hint, switch a view) is up to the `Navigator` implementation.

use std::sync::Mutex;

/// Screens the core may ask the front end to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Screen {
    /// Discover and pair with a bridge.
    ConnectBridge,
    /// Pick the group used by the primary toggle.
    SelectPrimaryGroup,
}

pub type NavigationError = Box<dyn std::error::Error + Send + Sync>;

/// Front-end hook for switching screens.
pub trait Navigator: Send + Sync {
    fn navigate(&self, screen: Screen) -> Result<(), NavigationError>;
}

/// Navigator that goes nowhere.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn navigate(&self, _screen: Screen) -> Result<(), NavigationError> {
        Ok(())
    }
}

/// Navigator that records every request, for tests and diagnostics.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visited: Mutex<Vec<Screen>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visited(&self) -> Vec<Screen> {
        self.visited
            .lock()
            .map(|v| v.clone())
            .unwrap_or_default()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, screen: Screen) -> Result<(), NavigationError> {
        self.visited
            .lock()
            .map_err(|e| e.to_string())?
            .push(screen);
        Ok(())
    }
}
