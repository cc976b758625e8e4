// Hue v1 wire types
//
// These mirror the JSON shapes returned by `/api/{username}/lights` and
// `/groups`. Only the fields a light or group cannot be rendered without
// are required; everything else is optional so firmware differences don't
// turn into parse failures.

use serde::{Deserialize, Serialize};

use crate::address::BridgeAddress;

/// Minimum member count for a group to be offered in group listings.
pub const MIN_DISPLAY_LIGHTS: usize = 2;

// ── Lights ──────────────────────────────────────────────────────────

/// A light as reported by `GET /lights/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Light {
    pub state: LightState,
    #[serde(rename = "type")]
    pub light_type: String,
    pub name: String,
    #[serde(default, rename = "modelid", skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    #[serde(default, rename = "manufacturername", skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(default, rename = "productname", skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(default, rename = "uniqueid", skip_serializing_if = "Option::is_none")]
    pub unique_id: Option<String>,
    #[serde(default, rename = "swversion", skip_serializing_if = "Option::is_none")]
    pub sw_version: Option<String>,
}

impl Light {
    /// Brightness as a percentage of the 0-254 range, if the light dims.
    pub fn brightness_percent(&self) -> Option<u8> {
        self.state
            .bri
            .map(|bri| u8::try_from((u32::from(bri) * 100 + 127) / 254).unwrap_or(100))
    }
}

/// Current state of a light.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightState {
    pub on: bool,
    /// Brightness, 0-254.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bri: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hue: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sat: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xy: Option<[f64; 2]>,
    /// Color temperature in mireds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ct: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colormode: Option<String>,
    #[serde(default = "reachable_default")]
    pub reachable: bool,
}

fn reachable_default() -> bool {
    true
}

// ── Groups ──────────────────────────────────────────────────────────

/// A group as reported by `GET /groups/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    /// Member light ids, in bridge order.
    pub lights: Vec<String>,
    #[serde(rename = "type")]
    pub group_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    /// The last action applied to the whole group.
    #[serde(default)]
    pub action: StatePatch,
    #[serde(default)]
    pub state: GroupState,
}

impl Group {
    /// Groups with a single light duplicate the light itself and are hidden.
    pub fn is_display_eligible(&self) -> bool {
        self.lights.len() >= MIN_DISPLAY_LIGHTS
    }

    /// "All On", "Partially On" or "All Off".
    pub fn state_label(&self) -> &'static str {
        if self.state.all_on {
            "All On"
        } else if self.state.any_on {
            "Partially On"
        } else {
            "All Off"
        }
    }
}

/// Aggregate on/off state of a group's members.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupState {
    #[serde(default)]
    pub all_on: bool,
    #[serde(default)]
    pub any_on: bool,
}

// ── State patches ───────────────────────────────────────────────────

/// Partial state sent to `PUT /lights/{id}/state` or `/groups/{id}/action`.
///
/// Only fields that are set are serialized; the bridge leaves the rest
/// untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bri: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hue: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sat: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xy: Option<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ct: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<String>,
    /// Transition duration in multiples of 100ms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transitiontime: Option<u16>,
}

impl StatePatch {
    /// A patch that only switches power.
    pub fn power(on: bool) -> Self {
        Self {
            on: Some(on),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// One `{"success": {"/lights/1/state/on": true}}` entry from a PUT.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Applied {
    pub path: String,
    pub value: serde_json::Value,
}

// ── Discovery & pairing ─────────────────────────────────────────────

/// Raw record from the public discovery endpoint.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct DiscoveryRecord {
    #[serde(default)]
    pub id: Option<String>,
    pub internalipaddress: String,
    pub port: u16,
}

/// A bridge found by discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveredBridge {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub address: BridgeAddress,
    pub port: u16,
}

/// Error object embedded in Hue response arrays.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiErrorDetail {
    #[serde(default, rename = "type")]
    pub error_type: Option<u16>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Single element of the pairing response array.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PairingEntry {
    #[serde(default)]
    pub success: Option<PairingSuccess>,
    #[serde(default)]
    pub error: Option<ApiErrorDetail>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PairingSuccess {
    #[serde(default)]
    pub username: Option<String>,
}
