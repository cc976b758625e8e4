//! CLI configuration: thin wrapper around `huely_config`.
//!
//! Fills unset global flags from `[defaults]`, layers `--bridge` /
//! `--username` over the stored settings, and builds the `Hue` facade.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::ValueEnum;
use tracing::debug;

use huely_config::{Config, FileSettingsStore};
use huely_core::{
    CoreError, DEFAULT_DEVICE_TYPE, Hue, HueConfig, NavigationError, Navigator, Screen, SettingKey,
    SettingsStore, TransportConfig,
};

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

// ── Global flag resolution ──────────────────────────────────────────

impl GlobalOpts {
    /// Fill flags the user didn't pass from the config file's `[defaults]`.
    pub fn apply_defaults(&mut self, cfg: &Config) {
        if self.output.is_none() {
            self.output = OutputFormat::from_str(&cfg.defaults.output, true).ok();
        }
        if self.color.is_none() {
            self.color = ColorMode::from_str(&cfg.defaults.color, true).ok();
        }
        if self.timeout.is_none() {
            self.timeout = Some(cfg.defaults.timeout);
        }
    }

    pub fn format(&self) -> OutputFormat {
        self.output.unwrap_or(OutputFormat::Table)
    }

    pub fn color_mode(&self) -> ColorMode {
        self.color.unwrap_or(ColorMode::Auto)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout.filter(|t| *t > 0).unwrap_or(10))
    }
}

// ── Settings overrides ──────────────────────────────────────────────

/// Stored settings with `--bridge` / `--username` taking priority on read.
///
/// Writes always go to the underlying store.
struct OverrideStore {
    inner: FileSettingsStore,
    address: Option<String>,
    username: Option<String>,
}

impl SettingsStore for OverrideStore {
    fn get(&self, key: SettingKey) -> Result<Option<String>, CoreError> {
        let flag = match key {
            SettingKey::BridgeAddress => self.address.as_ref(),
            SettingKey::BridgeUsername => self.username.as_ref(),
            SettingKey::PrimaryGroup => None,
        };
        match flag {
            Some(value) => Ok(Some(value.clone())),
            None => self.inner.get(key),
        }
    }

    fn set(&self, key: SettingKey, value: &str) -> Result<(), CoreError> {
        self.inner.set(key, value)
    }

    fn remove(&self, key: SettingKey) -> Result<(), CoreError> {
        self.inner.remove(key)
    }
}

// ── Navigation ──────────────────────────────────────────────────────

/// Remembers the last screen the core asked for.
///
/// The CLI can't switch views mid-command, so `run` checks this after the
/// command finishes and offers to open the screen.
#[derive(Debug, Default)]
pub struct CliNavigator {
    requested: Mutex<Option<Screen>>,
}

impl CliNavigator {
    pub fn take(&self) -> Option<Screen> {
        self.requested.lock().ok().and_then(|mut s| s.take())
    }
}

impl Navigator for CliNavigator {
    fn navigate(&self, screen: Screen) -> Result<(), NavigationError> {
        debug!(%screen, "screen requested");
        *self.requested.lock().map_err(|e| e.to_string())? = Some(screen);
        Ok(())
    }
}

// ── Facade construction ─────────────────────────────────────────────

/// Build the `Hue` facade from the config file plus CLI overrides.
pub fn build_hue(
    global: &GlobalOpts,
    cfg: &Config,
    navigator: Arc<CliNavigator>,
) -> Result<Hue, CliError> {
    let store = OverrideStore {
        inner: FileSettingsStore::open()?,
        address: global.bridge.clone().filter(|b| !b.is_empty()),
        username: global.username.clone().filter(|u| !u.is_empty()),
    };

    let config = HueConfig {
        transport: TransportConfig::default().with_timeout(global.timeout()),
        device_type: cfg
            .bridge
            .device_type
            .clone()
            .unwrap_or_else(|| DEFAULT_DEVICE_TYPE.to_owned()),
        discovery_url: None,
        port: cfg.bridge.port,
    };

    Ok(Hue::new(config, Arc::new(store), navigator)?)
}
