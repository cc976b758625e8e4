// ── Settings storage port ──
//
// The bridge address, username, and primary group id are plain strings in
// a key-value store owned by the front end. `SettingsStore` is the seam;
// `MemoryStore` backs tests and ephemeral sessions.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::CoreError;

/// Keys persisted by the store. Names match what earlier releases wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::IntoStaticStr)]
pub enum SettingKey {
    #[strum(serialize = "bridgeIP")]
    BridgeAddress,
    #[strum(serialize = "bridgeUsername")]
    BridgeUsername,
    #[strum(serialize = "primaryGroupId")]
    PrimaryGroup,
}

impl SettingKey {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Key-value storage for bridge settings.
pub trait SettingsStore: Send + Sync {
    /// Raw stored value, or `None` if the key was never written.
    fn get(&self, key: SettingKey) -> Result<Option<String>, CoreError>;

    fn set(&self, key: SettingKey, value: &str) -> Result<(), CoreError>;

    fn remove(&self, key: SettingKey) -> Result<(), CoreError>;

    /// Stored value after [`decode_stored`]; empty strings count as absent.
    fn get_decoded(&self, key: SettingKey) -> Result<Option<String>, CoreError> {
        Ok(self.get(key)?.and_then(|raw| decode_stored(&raw)))
    }
}

/// Unwrap a stored value.
///
/// Values written by a JSON-encoding host look like `"\"10.0.0.5\""`. A
/// value that parses as a JSON string is unwrapped; one that parses as any
/// other JSON value is treated as absent; anything that doesn't parse is
/// taken verbatim.
pub fn decode_stored(raw: &str) -> Option<String> {
    let value = match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::String(s)) => s,
        Ok(_) => return None,
        Err(_) => raw.to_owned(),
    };
    Some(value).filter(|v| !v.is_empty())
}

/// In-memory [`SettingsStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<SettingKey, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store with a bridge address and username.
    pub fn with_bridge(address: &str, username: &str) -> Self {
        let mut values = HashMap::new();
        values.insert(SettingKey::BridgeAddress, address.to_owned());
        values.insert(SettingKey::BridgeUsername, username.to_owned());
        Self {
            values: RwLock::new(values),
        }
    }
}

impl SettingsStore for MemoryStore {
    fn get(&self, key: SettingKey) -> Result<Option<String>, CoreError> {
        let values = self.values.read().map_err(CoreError::storage)?;
        Ok(values.get(&key).cloned())
    }

    fn set(&self, key: SettingKey, value: &str) -> Result<(), CoreError> {
        let mut values = self.values.write().map_err(CoreError::storage)?;
        values.insert(key, value.to_owned());
        Ok(())
    }

    fn remove(&self, key: SettingKey) -> Result<(), CoreError> {
        let mut values = self.values.write().map_err(CoreError::storage)?;
        values.remove(&key);
        Ok(())
    }
}
