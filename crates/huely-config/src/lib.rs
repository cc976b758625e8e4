//! Configuration for the huely CLI.
//!
//! A single TOML file holds output defaults and the `[bridge]` settings the
//! core reads through its `SettingsStore` port. The bridge username can live
//! in the system keyring instead of the file.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use huely_core::{BridgeAddress, CoreError, SettingKey, SettingsStore};

/// Service name for keyring entries.
pub const KEYRING_SERVICE: &str = "huely";
const KEYRING_USERNAME: &str = "bridge-username";

/// Environment variable that points at an alternate config file.
pub const CONFIG_ENV: &str = "HUELY_CONFIG";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("unknown config key '{key}'. Valid keys: {}", SETTABLE_KEYS.join(", "))]
    UnknownKey { key: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub bridge: BridgeSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Where the bridge username is kept.
    #[serde(default)]
    pub credential_store: CredentialStore,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
            credential_store: CredentialStore::default(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    10
}

/// Backend for the bridge username.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CredentialStore {
    /// Plaintext in `config.toml`.
    #[default]
    File,
    /// System keyring, service `huely`.
    Keyring,
}

/// The `[bridge]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct BridgeSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Username issued at pairing (only when `credential_store = "file"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_group: Option<String>,

    /// `devicetype` sent when pairing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_type: Option<String>,

    /// Non-standard bridge port.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

impl BridgeSettings {
    fn slot(&mut self, key: SettingKey) -> &mut Option<String> {
        match key {
            SettingKey::BridgeAddress => &mut self.address,
            SettingKey::BridgeUsername => &mut self.username,
            SettingKey::PrimaryGroup => &mut self.primary_group,
        }
    }

    fn value(&self, key: SettingKey) -> Option<&str> {
        match key {
            SettingKey::BridgeAddress => self.address.as_deref(),
            SettingKey::BridgeUsername => self.username.as_deref(),
            SettingKey::PrimaryGroup => self.primary_group.as_deref(),
        }
    }
}

// ── `config set` ────────────────────────────────────────────────────

/// Keys accepted by [`Config::set`].
pub const SETTABLE_KEYS: &[&str] = &[
    "defaults.output",
    "defaults.color",
    "defaults.timeout",
    "defaults.credential_store",
    "bridge.address",
    "bridge.primary_group",
    "bridge.device_type",
    "bridge.port",
];

impl Config {
    /// Set a dotted key from a string value, validating it first.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "defaults.output" => {
                if !matches!(value, "table" | "json" | "json-compact" | "yaml" | "plain") {
                    return Err(invalid(key, "must be table, json, json-compact, yaml or plain"));
                }
                self.defaults.output = value.into();
            }
            "defaults.color" => {
                if !matches!(value, "auto" | "always" | "never") {
                    return Err(invalid(key, "must be auto, always or never"));
                }
                self.defaults.color = value.into();
            }
            "defaults.timeout" => {
                self.defaults.timeout = value
                    .parse()
                    .ok()
                    .filter(|t| *t > 0)
                    .ok_or_else(|| invalid(key, "must be a positive number of seconds"))?;
            }
            "defaults.credential_store" => {
                self.defaults.credential_store = value
                    .parse()
                    .map_err(|_| invalid(key, "must be 'file' or 'keyring'"))?;
            }
            "bridge.address" => {
                let address: BridgeAddress = value.parse().map_err(|e| invalid(key, format!("{e}")))?;
                self.bridge.address = Some(address.to_string());
            }
            "bridge.primary_group" => self.bridge.primary_group = Some(value.into()),
            "bridge.device_type" => self.bridge.device_type = Some(value.into()),
            "bridge.port" => {
                self.bridge.port = Some(value.parse().map_err(|_| invalid(key, "must be a port number"))?);
            }
            other => return Err(ConfigError::UnknownKey { key: other.into() }),
        }
        Ok(())
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path: `HUELY_CONFIG`, then platform conventions.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }
    ProjectDirs::from("com", "huely", "huely").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("huely");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the default path and the environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config from `path`, then apply `HUELY_SECTION__KEY` overrides.
///
/// Only nested keys are taken from the environment, so `HUELY_BRIDGE` and
/// `HUELY_USERNAME` (CLI flag variables) don't collide with the tables.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = file_figment(path).merge(
        Env::prefixed("HUELY_")
            .split("__")
            .filter(|key| key.as_str().contains('.')),
    );
    Ok(figment.extract()?)
}

/// Load config, returning a default if it can't be read.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

/// Read only what is on disk, without environment overrides.
pub fn load_file(path: &Path) -> Result<Config, ConfigError> {
    Ok(file_figment(path).extract()?)
}

fn file_figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    debug!(path = %path.display(), "config saved");
    Ok(())
}

// ── Settings store ──────────────────────────────────────────────────

/// [`SettingsStore`] backed by the `[bridge]` table of the config file.
///
/// Reads see environment overrides; writes go to the file as it is on
/// disk, so overrides never get persisted. With
/// `credential_store = "keyring"` the username lives in the system keyring
/// and the file copy is only a fallback.
#[derive(Debug)]
pub struct FileSettingsStore {
    path: PathBuf,
    credential_store: CredentialStore,
    current: Mutex<BridgeSettings>,
}

impl FileSettingsStore {
    /// Open the store at the canonical config path.
    pub fn open() -> Result<Self, ConfigError> {
        Self::open_at(config_path())
    }

    pub fn open_at(path: PathBuf) -> Result<Self, ConfigError> {
        let config = load_config_from(&path)?;
        Ok(Self {
            path,
            credential_store: config.defaults.credential_store,
            current: Mutex::new(config.bridge),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn keyring_entry() -> Result<keyring::Entry, ConfigError> {
        Ok(keyring::Entry::new(KEYRING_SERVICE, KEYRING_USERNAME)?)
    }

    fn uses_keyring(&self, key: SettingKey) -> bool {
        key == SettingKey::BridgeUsername && self.credential_store == CredentialStore::Keyring
    }

    fn keyring_get() -> Result<Option<String>, ConfigError> {
        match Self::keyring_entry()?.get_password() {
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn keyring_remove() -> Result<(), ConfigError> {
        match Self::keyring_entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Apply `value` to `key` both on disk and in memory.
    fn write(&self, key: SettingKey, value: Option<&str>) -> Result<(), ConfigError> {
        let mut on_disk = load_file(&self.path)?;
        *on_disk.bridge.slot(key) = value.map(str::to_owned);
        save_config_to(&on_disk, &self.path)?;

        let mut current = self
            .current
            .lock()
            .map_err(|e| invalid("settings", e.to_string()))?;
        *current.slot(key) = value.map(str::to_owned);
        Ok(())
    }
}

impl SettingsStore for FileSettingsStore {
    fn get(&self, key: SettingKey) -> Result<Option<String>, CoreError> {
        if self.uses_keyring(key) {
            if let Some(secret) = Self::keyring_get().map_err(CoreError::storage)? {
                return Ok(Some(secret));
            }
        }
        let current = self.current.lock().map_err(CoreError::storage)?;
        Ok(current.value(key).map(str::to_owned))
    }

    fn set(&self, key: SettingKey, value: &str) -> Result<(), CoreError> {
        if self.uses_keyring(key) {
            Self::keyring_entry()
                .and_then(|entry| Ok(entry.set_password(value)?))
                .map_err(CoreError::storage)?;
            debug!("bridge username stored in keyring");
            return self.write(key, None).map_err(CoreError::storage);
        }
        self.write(key, Some(value)).map_err(CoreError::storage)
    }

    fn remove(&self, key: SettingKey) -> Result<(), CoreError> {
        if self.uses_keyring(key) {
            Self::keyring_remove().map_err(CoreError::storage)?;
        }
        self.write(key, None).map_err(CoreError::storage)
    }
}
