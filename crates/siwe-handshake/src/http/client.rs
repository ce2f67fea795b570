/*
[INPUT]:  HTTP configuration (base URL, endpoint paths, timeouts)
[OUTPUT]: Configured reqwest client sharing one relying-party session
[POS]:    HTTP layer - core client implementation
[UPDATE]: When adding connection options or session endpoints
*/

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Url};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{HandshakeError, Result};
use crate::types::AuthorizationStatus;

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Endpoint paths on the relying party
///
/// Resolved against the base URL like links in a page: relative paths keep
/// the base path (`https://host/app/` + `nonce`), a leading `/` starts from
/// the origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelyingPartyEndpoints {
    /// GET, returns a JSON nonce challenge
    pub nonce: String,
    /// POST, accepts the signed statement
    pub login: String,
    /// POST, reports whether the current session is authorized
    pub authorization: String,
    /// GET, invalidates the current session
    pub logout: String,
}

impl Default for RelyingPartyEndpoints {
    fn default() -> Self {
        Self {
            nonce: "nonce".to_string(),
            login: "./".to_string(),
            authorization: "auth".to_string(),
            logout: "logout".to_string(),
        }
    }
}

/// HTTP client for the relying party
///
/// Clones share the underlying connection pool and cookie jar, so the nonce
/// request and the sign-in submission ride on the same server-side session.
#[derive(Debug, Clone)]
pub struct RelyingPartyClient {
    http_client: Client,
    base_url: Url,
    endpoints: RelyingPartyEndpoints,
}

impl RelyingPartyClient {
    /// Create a client with default configuration and endpoint paths
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_config(ClientConfig::default(), base_url, RelyingPartyEndpoints::default())
    }

    pub fn with_config(
        config: ClientConfig,
        base_url: &str,
        endpoints: RelyingPartyEndpoints,
    ) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .cookie_store(true)
            .build()
            .map_err(|e| HandshakeError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            base_url: directory_url(base_url)?,
            endpoints,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn endpoints(&self) -> &RelyingPartyEndpoints {
        &self.endpoints
    }

    fn url(&self, endpoint: &str) -> Result<Url> {
        Ok(self.base_url.join(endpoint)?)
    }

    pub(crate) fn request(&self, method: Method, endpoint: &str) -> Result<RequestBuilder> {
        let url = self.url(endpoint)?;
        Ok(self.http_client.request(method, url))
    }

    /// Ask whether the current session is signed in with an authorized address
    ///
    /// POST {authorization}
    pub async fn authorization_status(&self) -> Result<AuthorizationStatus> {
        let response = self
            .request(Method::POST, &self.endpoints.authorization)?
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(HandshakeError::NetworkError(format!(
                "authorization probe returned status {status}"
            )));
        }
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Invalidate the current session
    ///
    /// GET {logout}
    pub async fn logout(&self) -> Result<()> {
        let response = self
            .request(Method::GET, &self.endpoints.logout)?
            .send()
            .await?;
        let status = response.status();
        if !(status.is_success() || status.is_redirection()) {
            return Err(HandshakeError::NetworkError(format!(
                "logout returned status {status}"
            )));
        }
        info!("session logged out");
        Ok(())
    }
}

/// Parse `base_url` so its last path segment counts as a directory
fn directory_url(base_url: &str) -> Result<Url> {
    let mut url = Url::parse(base_url)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
