// Bridge discovery via the public meethue endpoint.
//
// The endpoint answers with `[{"id", "internalipaddress", "port"}]` for
// every bridge that phoned home from the caller's public IP. No
// authentication is involved.

use std::time::Duration;

use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::address::BridgeAddress;
use crate::error::Error;
use crate::models::{DiscoveredBridge, DiscoveryRecord};
use crate::transport::{TransportConfig, status_text};

/// Public discovery endpoint.
pub const DISCOVERY_URL: &str = "https://discovery.meethue.com/";

const INVALID_FORMAT: &str = "Invalid discovery response format";

/// Discover bridges on the local network through the public endpoint.
pub async fn discover_bridges(transport: &TransportConfig) -> Result<Vec<DiscoveredBridge>, Error> {
    let http = transport.build_client()?;
    let url = Url::parse(DISCOVERY_URL)?;
    discover_bridges_at(&http, url, transport.timeout).await
}

/// Discover bridges using an explicit endpoint URL.
pub async fn discover_bridges_at(
    http: &reqwest::Client,
    url: Url,
    timeout: Duration,
) -> Result<Vec<DiscoveredBridge>, Error> {
    debug!(%url, "discovering bridges");

    let resp = http
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| Error::from_reqwest(e, "Bridge discovery", timeout))?;

    let status = resp.status();
    if !status.is_success() {
        return Err(Error::Connection {
            message: format!("Failed to discover bridges: {}", status_text(status)),
            status: Some(status.as_u16()),
        });
    }

    let body = resp
        .text()
        .await
        .map_err(|e| Error::from_reqwest(e, "Bridge discovery", timeout))?;
    let bridges = parse_discovery(&body)?;
    debug!(count = bridges.len(), "discovery complete");
    Ok(bridges)
}

/// Validate the discovery body. The endpoint did answer, so any shape
/// problem is a bridge-side error rather than a connection error.
fn parse_discovery(body: &str) -> Result<Vec<DiscoveredBridge>, Error> {
    let invalid = || Error::InvalidResponse {
        message: INVALID_FORMAT.into(),
        body: body.to_owned(),
    };

    let value: Value = serde_json::from_str(body).map_err(|_| invalid())?;
    if !value.is_array() {
        return Err(invalid());
    }
    let records: Vec<DiscoveryRecord> = serde_json::from_value(value).map_err(|_| invalid())?;

    records
        .into_iter()
        .map(|record| {
            let address: BridgeAddress = record.internalipaddress.parse().map_err(|_| invalid())?;
            Ok(DiscoveredBridge {
                id: record.id,
                address,
                port: record.port,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn parses_single_record() {
        let bridges = parse_discovery(r#"[{"internalipaddress":"10.0.0.5","port":80}]"#).expect("valid");
        assert_eq!(bridges.len(), 1);
        assert_eq!(bridges[0].address.to_string(), "10.0.0.5");
        assert_eq!(bridges[0].port, 80);
        assert!(bridges[0].id.is_none());
    }

    #[test]
    fn empty_array_is_no_bridges() {
        assert!(parse_discovery("[]").expect("valid").is_empty());
    }

    #[test]
    fn object_body_is_bridge_error() {
        let err = parse_discovery("{}").expect_err("non-array");
        assert_eq!(err.kind(), ErrorKind::Bridge);
        assert_eq!(err.to_string(), INVALID_FORMAT);
    }

    #[test]
    fn missing_port_is_bridge_error() {
        let err = parse_discovery(r#"[{"internalipaddress":"10.0.0.5"}]"#).expect_err("no port");
        assert_eq!(err.kind(), ErrorKind::Bridge);
    }

    #[test]
    fn bad_address_is_bridge_error() {
        let err = parse_discovery(r#"[{"internalipaddress":"fe80::1","port":443}]"#).expect_err("ipv6");
        assert_eq!(err.kind(), ErrorKind::Bridge);
    }
}
