/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared fixtures and a verifying mock relying party
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for siwe-handshake tests

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};
use siwe_handshake::agent::{decode_personal_message, parse_signature, recover_signer};
use siwe_handshake::{AuthStatement, LoginRequest};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Well-known development key and its address
pub const TEST_PRIVATE_KEY: &str =
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const TEST_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

/// Second development key, used as the "wrong" signer
pub const OTHER_PRIVATE_KEY: &str =
    "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
pub const OTHER_ADDRESS: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";

pub const TEST_DOMAIN: &str = "localhost";

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

#[derive(Debug, Default)]
struct RelyingPartyState {
    issued: HashSet<String>,
    consumed: HashSet<String>,
    counter: u64,
}

/// Relying party that issues nonces and verifies submissions the way a real
/// one would: signer recovery, domain match, nonce issued and unused, expiry.
#[derive(Debug, Clone)]
pub struct MockRelyingParty {
    domain: String,
    state: Arc<Mutex<RelyingPartyState>>,
}

impl MockRelyingParty {
    pub fn new(domain: &str) -> Self {
        Self {
            domain: domain.to_string(),
            state: Arc::new(Mutex::new(RelyingPartyState::default())),
        }
    }

    /// Register a nonce as issued, for nonces handed out of band
    pub fn issue(&self, nonce: &str) {
        self.state.lock().unwrap().issued.insert(nonce.to_string());
    }

    pub fn consumed(&self) -> usize {
        self.state.lock().unwrap().consumed.len()
    }

    /// Mount `GET /nonce` and `POST /` on `server`
    pub async fn mount(&self, server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/nonce"))
            .respond_with(NonceResponder(self.clone()))
            .mount(server)
            .await;

        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(self.clone())
            .mount(server)
            .await;
    }

    fn verify(&self, request: &Request) -> Result<String, (u16, String)> {
        let body: LoginRequest = serde_json::from_slice(&request.body)
            .map_err(|e| (422, format!("bad body: {e}")))?;

        let bytes = decode_personal_message(&body.message).map_err(|e| (400, e.to_string()))?;
        let text = String::from_utf8(bytes).map_err(|e| (400, e.to_string()))?;
        let statement: AuthStatement = text.parse().map_err(|e: siwe_handshake::HandshakeError| (400, e.to_string()))?;

        let signed_domain = statement.domain.split(':').next().unwrap_or_default();
        if signed_domain != self.domain {
            return Err((
                403,
                format!("Invalid domain '{}' is not '{}'", statement.domain, self.domain),
            ));
        }

        {
            let mut state = self.state.lock().unwrap();
            if !state.issued.contains(&statement.nonce) {
                return Err((403, "unknown nonce".to_string()));
            }
            if !state.consumed.insert(statement.nonce.clone()) {
                return Err((403, "nonce already used".to_string()));
            }
        }

        if statement
            .expiration_time
            .is_some_and(|expiration| expiration <= Utc::now())
        {
            return Err((403, "statement expired".to_string()));
        }

        let signature = parse_signature(&body.signature).map_err(|e| (400, e.to_string()))?;
        let signer = recover_signer(&text, &signature).map_err(|e| (401, e.to_string()))?;
        if signer != statement.address {
            return Err((401, "signature invalid".to_string()));
        }

        Ok(signer.checksummed())
    }
}

impl Respond for MockRelyingParty {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        match self.verify(request) {
            Ok(address) => ResponseTemplate::new(200).set_body_string(format!("signed in as {address}")),
            Err((status, reason)) => ResponseTemplate::new(status).set_body_string(reason),
        }
    }
}

struct NonceResponder(MockRelyingParty);

impl Respond for NonceResponder {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let mut state = self.0.state.lock().unwrap();
        state.counter += 1;
        let nonce = format!("rpNonce{:08}", state.counter);
        state.issued.insert(nonce.clone());

        let issued_at = Utc::now();
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "nonce": nonce,
            "issuedAt": issued_at,
            "expiresAt": issued_at + Duration::minutes(10),
        }))
    }
}
