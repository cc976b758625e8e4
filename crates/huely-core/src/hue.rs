// ── Hue facade ──
//
// Session-level operations on top of huely-api. Reads bridge settings from
// the injected `SettingsStore` on every call, so a connect or disconnect is
// visible to the next request without rebuilding anything, and asks the
// injected `Navigator` for the connect screen when a call fails for lack
// of a usable bridge.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use huely_api::{
    Applied, BridgeAddress, BridgeClient, DEFAULT_DEVICE_TYPE, DISCOVERY_URL, DiscoveredBridge, ErrorKind,
    Group, Light, StatePatch, TransportConfig,
};
use secrecy::SecretString;
use serde::Serialize;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::CoreError;
use crate::navigation::{Navigator, Screen};
use crate::store::{SettingKey, SettingsStore};

// ── Configuration ────────────────────────────────────────────────────

/// Settings that don't live in the store: how to reach things.
#[derive(Debug, Clone)]
pub struct HueConfig {
    pub transport: TransportConfig,
    /// Sent as `devicetype` when pairing.
    pub device_type: String,
    /// Discovery endpoint. `None` means the public Hue endpoint.
    pub discovery_url: Option<Url>,
    /// Bridge port. `None` means plain port 80.
    pub port: Option<u16>,
}

impl Default for HueConfig {
    fn default() -> Self {
        Self {
            transport: TransportConfig::default(),
            device_type: DEFAULT_DEVICE_TYPE.to_owned(),
            discovery_url: None,
            port: None,
        }
    }
}

// ── Results ──────────────────────────────────────────────────────────

/// An entity together with the id the bridge keys it by.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Keyed<T> {
    pub id: String,
    #[serde(flatten)]
    pub item: T,
}

/// Stored connection settings, as far as they can be read without I/O.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BridgeStatus {
    pub address: Option<String>,
    pub configured: bool,
    pub primary_group: Option<String>,
}

/// Outcome of a successful pairing.
#[derive(Debug, Clone)]
pub struct Pairing {
    pub address: BridgeAddress,
    pub username: SecretString,
}

/// Outcome of a light toggle.
#[derive(Debug, Clone, Serialize)]
pub struct LightToggle {
    pub id: String,
    pub name: String,
    pub on: bool,
    pub applied: Vec<Applied>,
}

/// Outcome of a group toggle.
#[derive(Debug, Clone, Serialize)]
pub struct GroupToggle {
    pub id: String,
    pub name: String,
    pub on: bool,
    pub applied: Vec<Applied>,
}

impl GroupToggle {
    /// What toggling again would do, e.g. "Turn Kitchen off".
    pub fn next_action(&self) -> String {
        format!("Turn {} {}", self.name, if self.on { "off" } else { "on" })
    }
}

// ── Hue ──────────────────────────────────────────────────────────────

/// Entry point for front ends.
///
/// Cheaply cloneable via `Arc<HueInner>`.
#[derive(Clone)]
pub struct Hue {
    inner: Arc<HueInner>,
}

struct HueInner {
    config: HueConfig,
    http: reqwest::Client,
    store: Arc<dyn SettingsStore>,
    navigator: Arc<dyn Navigator>,
}

impl std::fmt::Debug for Hue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hue")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl Hue {
    pub fn new(
        config: HueConfig,
        store: Arc<dyn SettingsStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, CoreError> {
        let http = config.transport.build_client()?;
        Ok(Self {
            inner: Arc::new(HueInner {
                config,
                http,
                store,
                navigator,
            }),
        })
    }

    pub fn config(&self) -> &HueConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<dyn SettingsStore> {
        &self.inner.store
    }

    fn timeout(&self) -> Duration {
        self.inner.config.transport.timeout
    }

    // ── Connection lifecycle ─────────────────────────────────────────

    /// Report stored settings. Does not contact the bridge.
    pub fn status(&self) -> Result<BridgeStatus, CoreError> {
        let store = &self.inner.store;
        let address = store.get_decoded(SettingKey::BridgeAddress)?;
        let username = store.get_decoded(SettingKey::BridgeUsername)?;
        Ok(BridgeStatus {
            configured: address.is_some() && username.is_some(),
            address,
            primary_group: store.get_decoded(SettingKey::PrimaryGroup)?,
        })
    }

    /// Look for bridges on the local network.
    pub async fn discover(&self) -> Result<Vec<DiscoveredBridge>, CoreError> {
        let url = match &self.inner.config.discovery_url {
            Some(url) => url.clone(),
            None => Url::parse(DISCOVERY_URL).map_err(huely_api::Error::from)?,
        };
        let bridges = huely_api::discover_bridges_at(&self.inner.http, url, self.timeout()).await?;
        debug!(count = bridges.len(), "bridges discovered");
        Ok(bridges)
    }

    /// Pair with the bridge at `address` and store the issued username.
    ///
    /// The link button on the bridge must have been pressed shortly
    /// before. Nothing is stored unless pairing succeeds.
    pub async fn connect(&self, address: &str) -> Result<Pairing, CoreError> {
        let address: BridgeAddress = address.parse()?;
        let url = self.api_root(&address)?;
        let username = huely_api::pair_at(
            &self.inner.http,
            url,
            &self.inner.config.device_type,
            self.timeout(),
        )
        .await?;

        let store = &self.inner.store;
        store.set(SettingKey::BridgeAddress, &address.to_string())?;
        store.set(SettingKey::BridgeUsername, &username)?;
        info!(%address, "bridge connected");

        Ok(Pairing {
            address,
            username: SecretString::from(username),
        })
    }

    /// Forget the stored address and username. The primary group is kept.
    pub fn disconnect(&self) -> Result<(), CoreError> {
        let store = &self.inner.store;
        store.remove(SettingKey::BridgeUsername)?;
        store.remove(SettingKey::BridgeAddress)?;
        info!("bridge disconnected");
        Ok(())
    }

    // ── Lights ───────────────────────────────────────────────────────

    pub async fn lights(&self) -> Result<Vec<Keyed<Light>>, CoreError> {
        let lights = self.with_client(|c| async move { c.get_lights().await }).await?;
        Ok(keyed(lights))
    }

    pub async fn light(&self, id: &str) -> Result<Light, CoreError> {
        let id = id.to_owned();
        self.with_client(|c| async move { c.get_light(&id).await }).await
    }

    pub async fn set_light_state(&self, id: &str, patch: &StatePatch) -> Result<Vec<Applied>, CoreError> {
        ensure_patch(patch)?;
        let (id, patch) = (id.to_owned(), patch.clone());
        self.with_client(|c| async move { c.set_light_state(&id, &patch).await })
            .await
    }

    /// Flip a light's power state.
    pub async fn toggle_light(&self, id: &str) -> Result<LightToggle, CoreError> {
        let light = self.light(id).await?;
        let on = !light.state.on;
        let applied = self.set_light_state(id, &StatePatch::power(on)).await?;
        debug!(id, on, "light toggled");
        Ok(LightToggle {
            id: id.to_owned(),
            name: light.name,
            on,
            applied,
        })
    }

    // ── Groups ───────────────────────────────────────────────────────

    /// Groups worth showing: those with at least two lights.
    pub async fn groups(&self) -> Result<Vec<Keyed<Group>>, CoreError> {
        let mut groups = self.all_groups().await?;
        groups.retain(|g| g.item.is_display_eligible());
        Ok(groups)
    }

    /// Every group the bridge reports, including single-light ones.
    pub async fn all_groups(&self) -> Result<Vec<Keyed<Group>>, CoreError> {
        let groups = self.with_client(|c| async move { c.get_groups().await }).await?;
        Ok(keyed(groups))
    }

    pub async fn group(&self, id: &str) -> Result<Group, CoreError> {
        let id = id.to_owned();
        self.with_client(|c| async move { c.get_group(&id).await }).await
    }

    pub async fn set_group_action(&self, id: &str, patch: &StatePatch) -> Result<Vec<Applied>, CoreError> {
        ensure_patch(patch)?;
        let (id, patch) = (id.to_owned(), patch.clone());
        self.with_client(|c| async move { c.set_group_action(&id, &patch).await })
            .await
    }

    /// Switch a group off if any member is on, otherwise on.
    ///
    /// Returns `Ok(None)` without contacting the bridge when no bridge is
    /// configured; the connect screen has been requested in that case.
    pub async fn toggle_group(&self, id: &str) -> Result<Option<GroupToggle>, CoreError> {
        let client = self.client().map_err(|e| self.fail(e))?;
        if !client.is_configured() {
            debug!(id, "no bridge configured, group toggle skipped");
            self.navigate(Screen::ConnectBridge);
            return Ok(None);
        }

        let group = client.get_group(id).await.map_err(|e| self.fail(e))?;
        let on = !group.state.any_on;
        let applied = client
            .set_group_action(id, &StatePatch::power(on))
            .await
            .map_err(|e| self.fail(e))?;
        debug!(id, on, "group toggled");

        Ok(Some(GroupToggle {
            id: id.to_owned(),
            name: group.name,
            on,
            applied,
        }))
    }

    // ── Primary group ────────────────────────────────────────────────

    pub fn primary_group(&self) -> Result<Option<String>, CoreError> {
        self.inner.store.get_decoded(SettingKey::PrimaryGroup)
    }

    /// Remember `id` as the group for one-shot toggling.
    ///
    /// The group must exist and be display-eligible.
    pub async fn select_primary_group(&self, id: &str) -> Result<Group, CoreError> {
        let group = self.group(id).await?;
        if !group.is_display_eligible() {
            return Err(CoreError::NotFound {
                entity_type: "group",
                identifier: id.to_owned(),
            });
        }
        self.inner.store.set(SettingKey::PrimaryGroup, id)?;
        info!(id, name = %group.name, "primary group selected");
        Ok(group)
    }

    /// Toggle the stored primary group.
    ///
    /// With no primary group stored, asks for the selection screen and
    /// fails with [`CoreError::NoPrimaryGroup`].
    pub async fn toggle_primary_group(&self) -> Result<Option<GroupToggle>, CoreError> {
        let Some(id) = self.primary_group()? else {
            self.navigate(Screen::SelectPrimaryGroup);
            return Err(CoreError::NoPrimaryGroup);
        };
        self.toggle_group(&id).await
    }

    // ── Internals ────────────────────────────────────────────────────

    /// Build a client from the stored settings.
    ///
    /// Missing settings give an unconfigured client whose calls fail with
    /// `NotConfigured`; a stored address or username the client can't use
    /// is an `InvalidConfiguration`.
    fn client(&self) -> Result<BridgeClient, CoreError> {
        let store = &self.inner.store;
        let address = store.get_decoded(SettingKey::BridgeAddress)?;
        let username = store.get_decoded(SettingKey::BridgeUsername)?;

        let client = BridgeClient::from_settings(
            self.inner.http.clone(),
            address.as_deref(),
            username.as_deref(),
            self.inner.config.port,
        )
        .map_err(invalid_configuration)?;
        Ok(client.with_timeout(self.timeout()))
    }

    /// `http://{address}[:{port}]/api/`
    fn api_root(&self, address: &BridgeAddress) -> Result<Url, CoreError> {
        huely_api::api_root(address, self.inner.config.port).map_err(invalid_configuration)
    }

    /// Run `f` against a fresh client, routing failures through [`Self::fail`].
    async fn with_client<T, F, Fut>(&self, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(BridgeClient) -> Fut,
        Fut: Future<Output = Result<T, huely_api::Error>>,
    {
        let client = self.client().map_err(|e| self.fail(e))?;
        f(client).await.map_err(|e| self.fail(e))
    }

    /// Convert an error and request the connect screen if it calls for one.
    fn fail(&self, err: impl Into<CoreError>) -> CoreError {
        let err = err.into();
        if err.needs_reconnect() {
            debug!(error = %err, "bridge unusable, requesting connect screen");
            self.navigate(Screen::ConnectBridge);
        }
        err
    }

    fn navigate(&self, screen: Screen) {
        if let Err(e) = self.inner.navigator.navigate(screen) {
            warn!(%screen, error = %e, "navigation failed");
        }
    }
}

fn ensure_patch(patch: &StatePatch) -> Result<(), CoreError> {
    if patch.is_empty() {
        return Err(CoreError::Validation {
            message: "State patch has no fields to apply".into(),
        });
    }
    Ok(())
}

/// Order by numeric id where possible ("2" before "10"), then lexically.
fn keyed<T>(map: BTreeMap<String, T>) -> Vec<Keyed<T>> {
    let mut entries: Vec<Keyed<T>> = map.into_iter().map(|(id, item)| Keyed { id, item }).collect();
    entries.sort_by(|a, b| compare_ids(&a.id, &b.id));
    entries
}

fn compare_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Settings the client can't be built from are a configuration problem.
fn invalid_configuration(err: huely_api::Error) -> CoreError {
    match err.kind() {
        ErrorKind::Validation => CoreError::InvalidConfiguration {
            message: err.to_string(),
        },
        _ => err.into(),
    }
}
