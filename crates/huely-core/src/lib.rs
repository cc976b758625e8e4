//! Bridge session logic between `huely-api` and front ends.
//!
//! - **[`Hue`]** is the facade front ends talk to. It reads the bridge
//!   address, username and primary group from a [`SettingsStore`] on every
//!   call and turns "no usable bridge" failures into a request for the
//!   connect screen through a [`Navigator`].
//!
//! - **[`SettingsStore`]** is the persistence port. [`MemoryStore`] backs
//!   tests; `huely-config` provides the file-backed store the CLI uses.
//!
//! - **[`FetchGate`]** debounces repeated fetches and drops new ones while
//!   a fetch is outstanding.
//!
//! - **[`CoreError`]** keeps the validation / connection / bridge split
//!   from `huely-api` and adds configuration errors.

pub mod error;
pub mod hue;
pub mod navigation;
pub mod store;
pub mod throttle;

// ── Primary re-exports ──────────────────────────────────────────────
pub use error::CoreError;
pub use hue::{BridgeStatus, GroupToggle, Hue, HueConfig, Keyed, LightToggle, Pairing};
pub use navigation::{NavigationError, Navigator, NoopNavigator, RecordingNavigator, Screen};
pub use store::{MemoryStore, SettingKey, SettingsStore, decode_stored};
pub use throttle::{FETCH_DEBOUNCE, FetchGate};

// Wire types front ends render directly.
pub use huely_api::error::{LINK_BUTTON_NOT_PRESSED, RESOURCE_NOT_AVAILABLE, UNAUTHORIZED_USER};
pub use huely_api::{
    Applied, BridgeAddress, DEFAULT_DEVICE_TYPE, DiscoveredBridge, ErrorKind, Group, GroupState, Light, LightState,
    StatePatch, TransportConfig,
};
