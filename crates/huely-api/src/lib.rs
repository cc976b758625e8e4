// huely-api: Async Rust client for the Philips Hue bridge local REST API

pub mod address;
pub mod client;
pub mod discovery;
pub mod error;
mod groups;
mod lights;
pub mod models;
pub mod pairing;
pub mod transport;

pub use address::BridgeAddress;
pub use client::{BridgeClient, api_root};
pub use discovery::{DISCOVERY_URL, discover_bridges, discover_bridges_at};
pub use error::{Error, ErrorKind};
pub use models::{Applied, DiscoveredBridge, Group, GroupState, Light, LightState, StatePatch};
pub use pairing::{DEFAULT_DEVICE_TYPE, pair_at, pair_with_bridge};
pub use reqwest::Method;
pub use transport::{REQUEST_TIMEOUT, TransportConfig};
