// Link-button pairing
//
// `POST /api` with a device type. The bridge only issues a username if its
// physical link button was pressed shortly before; otherwise it answers
// `[{"error": {"type": 101, "description": "link button not pressed"}}]`.
// There is no retry here: the user presses the button and resubmits.

use std::time::Duration;

use serde_json::json;
use tracing::{debug, info};
use url::Url;

use crate::address::BridgeAddress;
use crate::client::api_root;
use crate::error::Error;
use crate::models::PairingEntry;
use crate::transport::{TransportConfig, status_text};

/// Device type sent when pairing, in Hue's `application#device` form.
pub const DEFAULT_DEVICE_TYPE: &str = "huely#cli";

/// Pair with the bridge at `address` and return the issued username.
pub async fn pair_with_bridge(
    address: &str,
    device_type: &str,
    transport: &TransportConfig,
) -> Result<String, Error> {
    let address: BridgeAddress = address.parse()?;
    let http = transport.build_client()?;
    let url = api_root(&address, None)?;
    pair_at(&http, url, device_type, transport.timeout).await
}

/// Pair against an explicit `/api` URL.
pub async fn pair_at(
    http: &reqwest::Client,
    url: Url,
    device_type: &str,
    timeout: Duration,
) -> Result<String, Error> {
    debug!(device_type, "requesting bridge username");

    let resp = http
        .post(url)
        .timeout(timeout)
        .json(&json!({ "devicetype": device_type }))
        .send()
        .await
        .map_err(|e| Error::from_reqwest(e, "Bridge connection", timeout))?;

    let status = resp.status();
    if !status.is_success() {
        return Err(Error::Connection {
            message: format!("Failed to connect to bridge: {}", status_text(status)),
            status: Some(status.as_u16()),
        });
    }

    let body = resp
        .text()
        .await
        .map_err(|e| Error::from_reqwest(e, "Bridge connection", timeout))?;
    let username = parse_pairing(&body)?;
    info!("paired with bridge");
    Ok(username)
}

fn parse_pairing(body: &str) -> Result<String, Error> {
    let entries: Vec<PairingEntry> = serde_json::from_str(body).map_err(|e| Error::InvalidResponse {
        message: format!("Invalid pairing response: {e}"),
        body: body.to_owned(),
    })?;
    let Some(entry) = entries.into_iter().next() else {
        return Err(Error::bridge("No username received from bridge"));
    };

    if let Some(err) = entry.error {
        return Err(Error::Bridge {
            message: err
                .description
                .unwrap_or_else(|| "Unknown bridge error".into()),
            code: err.error_type,
        });
    }

    entry
        .success
        .and_then(|s| s.username)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| Error::bridge("No username received from bridge"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn success_yields_username() {
        assert_eq!(parse_pairing(r#"[{"success":{"username":"abc"}}]"#).expect("paired"), "abc");
    }

    #[test]
    fn error_keeps_bridge_description() {
        let err = parse_pairing(r#"[{"error":{"type":101,"description":"link button not pressed"}}]"#)
            .expect_err("not pressed");
        assert_eq!(err.to_string(), "link button not pressed");
        assert!(err.is_link_button_not_pressed());
    }

    #[test]
    fn success_without_username_is_bridge_error() {
        let err = parse_pairing(r#"[{"success":{}}]"#).expect_err("no username");
        assert_eq!(err.to_string(), "No username received from bridge");
        assert_eq!(err.kind(), ErrorKind::Bridge);
    }

    #[test]
    fn empty_array_is_bridge_error() {
        assert_eq!(parse_pairing("[]").expect_err("empty").kind(), ErrorKind::Bridge);
    }
}
