// Bridge HTTP client
//
// Wraps `reqwest::Client` with Hue URL construction, the configured /
// not-configured gate, the fixed per-call timeout, and error-array
// detection. Resource endpoints (lights, groups) are inherent methods
// implemented in their own modules on top of `request`.

use std::fmt;
use std::time::Duration;

use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::address::BridgeAddress;
use crate::error::Error;
use crate::models::{ApiErrorDetail, Applied};
use crate::transport::{REQUEST_TIMEOUT, TransportConfig, status_text};

/// Where authenticated requests go. Absent when the client is unconfigured.
struct Target {
    /// `http://{address}/api/{username}/`
    base_url: Url,
    username: SecretString,
}

/// Authenticated client for one Hue bridge.
///
/// Holds only immutable configuration, so it is `Send + Sync` and can be
/// shared across concurrent requests behind an `Arc`.
pub struct BridgeClient {
    http: reqwest::Client,
    target: Option<Target>,
    timeout: Duration,
}

impl fmt::Debug for BridgeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeClient")
            .field("configured", &self.is_configured())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl BridgeClient {
    /// Create a client for the bridge at `address`, authenticating as `username`.
    ///
    /// Fails with [`Error::Validation`] if `address` is not a dotted quad.
    pub fn new(address: &str, username: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::from_settings(http, Some(address), Some(username), None)?.with_timeout(transport.timeout))
    }

    /// Create a client from optionally-stored settings.
    ///
    /// An empty or missing address or username produces an unconfigured
    /// client: every request fails with [`Error::NotConfigured`] before any
    /// I/O is attempted. A present but malformed address is still rejected.
    /// `port` overrides the bridge's default port 80.
    pub fn from_settings(
        http: reqwest::Client,
        address: Option<&str>,
        username: Option<&str>,
        port: Option<u16>,
    ) -> Result<Self, Error> {
        let address = address
            .filter(|a| !a.is_empty())
            .map(str::parse::<BridgeAddress>)
            .transpose()?;
        let username = username.filter(|u| !u.is_empty());
        match (address, username) {
            (Some(address), Some(username)) => {
                let client = Self::with_base_url(http, api_root(&address, port)?, username)?;
                if let Some(target) = &client.target {
                    debug!(url = %redact(&target.base_url, &target.username), "bridge client ready");
                }
                Ok(client)
            }
            _ => Ok(Self::unconfigured(http)),
        }
    }

    /// Create a client with no bridge to talk to.
    ///
    /// Every request fails with [`Error::NotConfigured`] without I/O.
    pub fn unconfigured(http: reqwest::Client) -> Self {
        Self {
            http,
            target: None,
            timeout: REQUEST_TIMEOUT,
        }
    }

    /// Create a client against an arbitrary API root (e.g. `http://host:port/api/`).
    ///
    /// `api_root` must be the `/api/` root; the username is appended as one
    /// percent-encoded path segment. An empty username gives an
    /// unconfigured client.
    pub fn with_base_url(http: reqwest::Client, api_root: Url, username: &str) -> Result<Self, Error> {
        if username.is_empty() {
            return Ok(Self::unconfigured(http));
        }
        Ok(Self {
            http,
            target: Some(Target {
                base_url: user_base_url(api_root, username)?,
                username: SecretString::from(username.to_owned()),
            }),
            timeout: REQUEST_TIMEOUT,
        })
    }

    /// Override the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Whether both an address and a username are present.
    pub fn is_configured(&self) -> bool {
        self.target.is_some()
    }

    /// The username this client authenticates with, if configured.
    pub fn username(&self) -> Option<&SecretString> {
        self.target.as_ref().map(|t| &t.username)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    // ── URL builders ─────────────────────────────────────────────────

    #[cfg(test)]
    pub(crate) fn base_url(&self) -> Option<&Url> {
        self.target.as_ref().map(|t| &t.base_url)
    }

    /// Resolve a resource path (e.g. `lights/1/state`) against the base URL.
    fn resource_url(&self, path: &str) -> Result<Url, Error> {
        let target = self.target.as_ref().ok_or(Error::NotConfigured)?;
        Ok(target.base_url.join(path.trim_start_matches('/'))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Issue an authenticated request and return the JSON body as-is.
    ///
    /// The configuration gate runs first, so an unconfigured client never
    /// touches the network. A 2xx body whose first element carries an
    /// `error` key becomes [`Error::Bridge`]; non-2xx becomes
    /// [`Error::Connection`].
    pub async fn request(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value, Error> {
        self.send(method, path, body).await
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let value = self.send::<()>(Method::GET, path, None).await?;
        parse_body(value)
    }

    pub(crate) async fn put(&self, path: &str, body: &(impl Serialize + Sync)) -> Result<Vec<Applied>, Error> {
        let value = self.send(Method::PUT, path, Some(body)).await?;
        parse_applied(value)
    }

    async fn send<B: Serialize + ?Sized + Sync>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Value, Error> {
        let url = self.resource_url(path)?;
        debug!(%method, path, "bridge request");

        let mut builder = self.http.request(method, url).timeout(self.timeout);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let resp = builder
            .send()
            .await
            .map_err(|e| Error::from_reqwest(e, "API request", self.timeout))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Connection {
                message: format!("API request failed: {}", status_text(status)),
                status: Some(status.as_u16()),
            });
        }

        let text = resp
            .text()
            .await
            .map_err(|e| Error::from_reqwest(e, "API request", self.timeout))?;
        trace!(len = text.len(), "bridge response");
        let value: Value = serde_json::from_str(&text).map_err(|e| Error::InvalidResponse {
            message: format!("Invalid response format from API: {e}"),
            body: text.clone(),
        })?;

        if let Some(err) = embedded_error(&value) {
            return Err(err);
        }
        Ok(value)
    }
}

/// `http://{address}[:{port}]/api/`, the unauthenticated root used by pairing.
pub fn api_root(address: &BridgeAddress, port: Option<u16>) -> Result<Url, Error> {
    let host = match port {
        Some(port) => format!("{address}:{port}"),
        None => address.to_string(),
    };
    Ok(Url::parse(&format!("http://{host}/api/"))?)
}

/// Append `{username}/` to an `/api/` root.
fn user_base_url(mut root: Url, username: &str) -> Result<Url, Error> {
    if matches!(username, "." | "..") {
        return Err(Error::validation("Invalid bridge username"));
    }
    root.path_segments_mut()
        .map_err(|()| Error::validation("API root cannot hold a username"))?
        .pop_if_empty()
        .push(username)
        .push("");
    Ok(root)
}

/// Reject ids that would change the request path.
pub(crate) fn check_id(kind: &str, id: &str) -> Result<(), Error> {
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_') {
        return Err(Error::validation(format!("Invalid {kind} id: {id:?}")));
    }
    Ok(())
}

/// The bridge reports most failures as `[{"error": {...}}]` with HTTP 200.
pub(crate) fn embedded_error(value: &Value) -> Option<Error> {
    let detail = value.as_array()?.first()?.get("error")?;
    let detail: ApiErrorDetail = serde_json::from_value(detail.clone()).unwrap_or(ApiErrorDetail {
        error_type: None,
        description: None,
    });
    Some(Error::Bridge {
        message: detail
            .description
            .unwrap_or_else(|| "Unknown bridge error".into()),
        code: detail.error_type,
    })
}

fn parse_body<T: DeserializeOwned>(value: Value) -> Result<T, Error> {
    serde_json::from_value(value.clone()).map_err(|e| Error::InvalidResponse {
        message: format!("Invalid response format from API: {e}"),
        body: value.to_string(),
    })
}

/// Flatten `[{"success": {path: value}}, ...]` into [`Applied`] entries.
fn parse_applied(value: Value) -> Result<Vec<Applied>, Error> {
    let Some(entries) = value.as_array() else {
        return Err(Error::InvalidResponse {
            message: "Invalid response format from API: expected an array".into(),
            body: value.to_string(),
        });
    };
    let mut applied = Vec::new();
    for entry in entries {
        if let Some(success) = entry.get("success").and_then(Value::as_object) {
            applied.extend(success.iter().map(|(path, value)| Applied {
                path: path.clone(),
                value: value.clone(),
            }));
        }
    }
    Ok(applied)
}

/// Redacted view of a base URL for logs.
pub(crate) fn redact(url: &Url, secret: &SecretString) -> String {
    let secret = secret.expose_secret();
    if secret.is_empty() {
        return url.to_string();
    }
    url.as_str().replace(secret, "****")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn new_targets_username_once() {
        let client = BridgeClient::new("192.168.1.2", "abc", &TransportConfig::default()).expect("valid");
        assert_eq!(client.base_url().map(Url::as_str), Some("http://192.168.1.2/api/abc/"));
        assert_eq!(
            client.resource_url("lights").expect("configured").as_str(),
            "http://192.168.1.2/api/abc/lights"
        );
        assert_eq!(
            client.resource_url("lights/1/state").expect("configured").as_str(),
            "http://192.168.1.2/api/abc/lights/1/state"
        );
    }

    #[test]
    fn from_settings_applies_port() {
        let http = reqwest::Client::new();
        let client = BridgeClient::from_settings(http, Some("10.0.0.5"), Some("abc"), Some(8080)).expect("valid");
        assert_eq!(
            client.resource_url("groups").expect("configured").as_str(),
            "http://10.0.0.5:8080/api/abc/groups"
        );
    }

    #[test]
    fn username_is_a_single_path_segment() {
        let root = Url::parse("http://10.0.0.5/api/").expect("root");
        let client = BridgeClient::with_base_url(reqwest::Client::new(), root, "a/b?c#d:e").expect("encoded");
        let url = client.resource_url("lights").expect("configured");
        assert_eq!(url.path(), "/api/a%2Fb%3Fc%23d:e/lights");
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn dot_usernames_are_rejected() {
        let root = Url::parse("http://10.0.0.5/api/").expect("root");
        for name in [".", ".."] {
            let err = BridgeClient::with_base_url(reqwest::Client::new(), root.clone(), name).expect_err("dot segment");
            assert_eq!(err.kind(), ErrorKind::Validation);
        }
    }

    #[test]
    fn empty_username_is_unconfigured() {
        let root = Url::parse("http://10.0.0.5/api/").expect("root");
        let client = BridgeClient::with_base_url(reqwest::Client::new(), root, "").expect("unconfigured");
        assert!(!client.is_configured());
        assert_eq!(client.resource_url("lights").expect_err("no target").kind(), ErrorKind::Configuration);
    }

    #[test]
    fn new_rejects_bad_address() {
        let err = BridgeClient::new("999.0.0.1", "abc", &TransportConfig::default()).expect_err("invalid");
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn from_settings_without_username_is_unconfigured() {
        let client = BridgeClient::from_settings(reqwest::Client::new(), Some("10.0.0.5"), None, None)
            .expect("valid address");
        assert!(!client.is_configured());
        let client = BridgeClient::from_settings(reqwest::Client::new(), Some(""), Some(""), None)
            .expect("empty settings");
        assert!(!client.is_configured());
    }

    #[test]
    fn from_settings_still_validates_address() {
        let err = BridgeClient::from_settings(reqwest::Client::new(), Some("nope"), None, None)
            .expect_err("invalid address");
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn embedded_error_reads_first_element() {
        let body = json!([{ "error": { "type": 1, "address": "/lights", "description": "unauthorized user" } }]);
        let err = embedded_error(&body).expect("error present");
        assert_eq!(err.to_string(), "unauthorized user");
        assert!(err.is_unauthorized());

        assert!(embedded_error(&json!([{ "success": { "/lights/1/state/on": true } }])).is_none());
        assert!(embedded_error(&json!({ "1": { "name": "x" } })).is_none());
    }

    #[test]
    fn check_id_rejects_path_segments() {
        assert!(check_id("light", "12").is_ok());
        assert!(check_id("light", "").is_err());
        assert!(check_id("light", "1/../../config").is_err());
        assert!(check_id("group", "1?x=2").is_err());
    }

    #[test]
    fn redact_hides_username() {
        let secret = SecretString::from("s3cret".to_owned());
        let client = BridgeClient::new("10.0.0.5", "s3cret", &TransportConfig::default()).expect("valid");
        let url = client.base_url().expect("configured");
        assert_eq!(redact(url, &secret), "http://10.0.0.5/api/****/");
    }

    #[test]
    fn debug_does_not_leak_username() {
        let client = BridgeClient::new("10.0.0.5", "s3cret", &TransportConfig::default()).expect("valid");
        assert!(!format!("{client:?}").contains("s3cret"));
    }
}
