/*
[INPUT]:  SignedAuthRequest (statement bound to its signature)
[OUTPUT]: SubmitResult on success, SignInRejected / NetworkError otherwise
[POS]:    HTTP layer - sign-in submission to the relying party
[UPDATE]: When the login endpoint contract changes
*/

use reqwest::Method;
use tracing::{info, warn};

use super::RelyingPartyClient;
use crate::agent::SignedAuthRequest;
use crate::error::{HandshakeError, Result};
use crate::types::SubmitResult;

const MAX_REASON_LEN: usize = 512;

/// Posts signed statements to the relying party's verification endpoint
///
/// Signature recovery, nonce single-use, and expiry checks are the relying
/// party's job; this side only classifies the outcome.
#[derive(Debug, Clone)]
pub struct AuthSubmitter {
    client: RelyingPartyClient,
}

impl AuthSubmitter {
    pub fn new(client: RelyingPartyClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &RelyingPartyClient {
        &self.client
    }

    /// POST {login} with `{"message": "0x..", "signature": "0x.."}`
    pub async fn submit(&self, request: &SignedAuthRequest) -> Result<SubmitResult> {
        let endpoint = self.client.endpoints().login.clone();
        let builder = self
            .client
            .request(Method::POST, &endpoint)?
            .json(&request.to_login_request());

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            info!(
                address = %request.statement().address,
                status = status.as_u16(),
                "sign-in accepted"
            );
            return Ok(SubmitResult {
                status: status.as_u16(),
                body,
            });
        }

        warn!(
            address = %request.statement().address,
            status = status.as_u16(),
            "sign-in rejected"
        );
        Err(HandshakeError::SignInRejected {
            status: status.as_u16(),
            reason: truncate_reason(body),
        })
    }
}

fn truncate_reason(mut body: String) -> String {
    if body.len() > MAX_REASON_LEN {
        let mut cut = MAX_REASON_LEN;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    body
}
