// Group endpoints
//
// The client returns every group the bridge reports. Hiding single-light
// groups is a listing concern and lives with the caller.

use std::collections::BTreeMap;

use tracing::debug;

use crate::client::{BridgeClient, check_id};
use crate::error::Error;
use crate::models::{Applied, Group, StatePatch};

impl BridgeClient {
    /// List every group, keyed by group id.
    ///
    /// `GET /groups`
    pub async fn get_groups(&self) -> Result<BTreeMap<String, Group>, Error> {
        debug!("listing groups");
        self.get("groups").await
    }

    /// Fetch one group.
    ///
    /// `GET /groups/{id}`
    pub async fn get_group(&self, id: &str) -> Result<Group, Error> {
        check_id("group", id)?;
        self.get(&format!("groups/{id}")).await
    }

    /// Apply a partial action to every light in a group.
    ///
    /// `PUT /groups/{id}/action`
    pub async fn set_group_action(&self, id: &str, patch: &StatePatch) -> Result<Vec<Applied>, Error> {
        check_id("group", id)?;
        debug!(id, ?patch, "setting group action");
        self.put(&format!("groups/{id}/action"), patch).await
    }
}
