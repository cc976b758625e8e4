// Light endpoints
//
// Thin path/verb bindings over `BridgeClient::request`. Bodies are parsed
// into typed lights at this boundary; a shape mismatch surfaces as
// `Error::InvalidResponse`.

use std::collections::BTreeMap;

use tracing::debug;

use crate::client::{BridgeClient, check_id};
use crate::error::Error;
use crate::models::{Applied, Light, StatePatch};

impl BridgeClient {
    /// List every light known to the bridge, keyed by light id.
    ///
    /// `GET /lights`
    pub async fn get_lights(&self) -> Result<BTreeMap<String, Light>, Error> {
        debug!("listing lights");
        self.get("lights").await
    }

    /// Fetch one light.
    ///
    /// `GET /lights/{id}`
    pub async fn get_light(&self, id: &str) -> Result<Light, Error> {
        check_id("light", id)?;
        self.get(&format!("lights/{id}")).await
    }

    /// Apply a partial state to one light.
    ///
    /// `PUT /lights/{id}/state`
    pub async fn set_light_state(&self, id: &str, patch: &StatePatch) -> Result<Vec<Applied>, Error> {
        check_id("light", id)?;
        debug!(id, ?patch, "setting light state");
        self.put(&format!("lights/{id}/state"), patch).await
    }
}
