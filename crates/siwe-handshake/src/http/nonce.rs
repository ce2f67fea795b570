/*
[INPUT]:  Relying-party nonce endpoint or caller-supplied challenge
[OUTPUT]: Validated single-use Nonce for one sign-in attempt
[POS]:    HTTP layer - challenge issuance
[UPDATE]: When the nonce endpoint contract or lifetime defaults change
*/

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::Method;
use tracing::debug;

use super::RelyingPartyClient;
use crate::error::{HandshakeError, Result};
use crate::types::{Nonce, NonceResponse};

/// Lifetime assumed when the relying party does not state one
pub const DEFAULT_NONCE_TTL_SECS: i64 = 10 * 60;

/// Supplies the challenge for one sign-in attempt
#[async_trait]
pub trait NonceSource: Send + Sync {
    async fn issue(&self) -> Result<Nonce>;
}

/// Fetches a nonce from the relying party
///
/// GET {nonce} -> `{"nonce": "...", "issuedAt": "...", "expiresAt": "..."}`
#[derive(Debug, Clone)]
pub struct HttpNonceSource {
    client: RelyingPartyClient,
}

impl HttpNonceSource {
    pub fn new(client: RelyingPartyClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NonceSource for HttpNonceSource {
    async fn issue(&self) -> Result<Nonce> {
        let endpoint = self.client.endpoints().nonce.clone();
        let response = self.client.request(Method::GET, &endpoint)?.send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(HandshakeError::NetworkError(format!(
                "nonce endpoint returned status {status}"
            )));
        }

        let body = response.text().await?;
        let payload: NonceResponse = serde_json::from_str(&body)?;

        let issued_at = payload.issued_at.unwrap_or_else(Utc::now);
        let expires_at = payload
            .expires_at
            .unwrap_or(issued_at + Duration::seconds(DEFAULT_NONCE_TTL_SECS));
        let nonce = Nonce::new(payload.nonce, issued_at, expires_at)?;

        debug!(nonce = nonce.value(), expires_at = %nonce.expires_at(), "nonce issued");
        Ok(nonce)
    }
}

/// Hands out a caller-supplied nonce exactly once
///
/// For environments where the challenge arrives out of band, e.g. embedded in
/// the login page that started the flow.
#[derive(Debug)]
pub struct StaticNonceSource {
    nonce: Mutex<Option<Nonce>>,
}

impl StaticNonceSource {
    pub fn new(nonce: Nonce) -> Self {
        Self {
            nonce: Mutex::new(Some(nonce)),
        }
    }
}

#[async_trait]
impl NonceSource for StaticNonceSource {
    async fn issue(&self) -> Result<Nonce> {
        let taken = self
            .nonce
            .lock()
            .map_err(|_| HandshakeError::InvalidResponse("nonce source poisoned".to_string()))?
            .take();
        taken.ok_or_else(|| HandshakeError::invalid_field("nonce", "already consumed"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn source_for(server: &MockServer) -> HttpNonceSource {
        HttpNonceSource::new(RelyingPartyClient::new(&server.uri()).unwrap())
    }

    #[tokio::test]
    async fn test_http_nonce_source() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/nonce"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "nonce": "Yk2mLq9xA7",
                "issuedAt": "2030-01-01T00:00:00Z",
                "expiresAt": "2030-01-01T00:10:00Z",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let nonce = source_for(&server).await.issue().await.unwrap();
        assert_eq!(nonce.value(), "Yk2mLq9xA7");
        assert_eq!(
            nonce.expires_at() - nonce.issued_at(),
            Duration::minutes(10)
        );
    }

    #[tokio::test]
    async fn test_http_nonce_default_lifetime() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/nonce"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"nonce": "32891757"})),
            )
            .mount(&server)
            .await;

        let nonce = source_for(&server).await.issue().await.unwrap();
        assert_eq!(
            nonce.expires_at() - nonce.issued_at(),
            Duration::seconds(DEFAULT_NONCE_TTL_SECS)
        );
    }

    #[tokio::test]
    async fn test_http_nonce_rejects_weak_nonce() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/nonce"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"nonce": "1234"})),
            )
            .mount(&server)
            .await;

        let err = source_for(&server).await.issue().await.unwrap_err();
        assert!(matches!(err, HandshakeError::InvalidField { field: "nonce", .. }));
    }

    #[tokio::test]
    async fn test_http_nonce_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/nonce"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = source_for(&server).await.issue().await.unwrap_err();
        assert!(matches!(err, HandshakeError::NetworkError(_)));
    }

    #[tokio::test]
    async fn test_http_nonce_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/nonce"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
            .mount(&server)
            .await;

        let err = source_for(&server).await.issue().await.unwrap_err();
        assert!(matches!(err, HandshakeError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_static_nonce_is_single_use() {
        let source = StaticNonceSource::new(Nonce::generate(Duration::minutes(5)));
        assert!(source.issue().await.is_ok());
        assert!(matches!(
            source.issue().await,
            Err(HandshakeError::InvalidField { field: "nonce", .. })
        ));
    }
}
