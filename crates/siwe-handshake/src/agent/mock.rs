/*
[INPUT]:  Scripted accounts, signatures and failures
[OUTPUT]: Deterministic signing agent for tests
[POS]:    Agent layer - test double for the external key holder
[UPDATE]: When new agent behaviours need to be simulated
*/

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::local::LocalKeyAgent;
use super::traits::{AgentError, SigningAgent};

#[derive(Debug)]
enum MockSigning {
    Fixed(String),
    Key(LocalKeyAgent),
    Fail(AgentError),
}

/// Mock signing agent for testing
///
/// Counts every request so tests can assert that a failed step was the last
/// call made to the agent.
#[derive(Debug)]
pub struct MockSigningAgent {
    accounts: Result<Vec<String>, AgentError>,
    signing: MockSigning,
    account_requests: AtomicUsize,
    sign_requests: AtomicUsize,
    last_sign_request: Mutex<Option<(String, String)>>,
}

impl MockSigningAgent {
    /// Agent that reports `accounts` and always returns `signature`
    pub fn new(accounts: Vec<String>, signature: &str) -> Self {
        Self::build(Ok(accounts), MockSigning::Fixed(signature.to_string()))
    }

    /// Agent that reports `accounts` but signs with `key`, whichever account
    /// was requested (models a wallet whose active account changed)
    pub fn with_key(accounts: Vec<String>, key: LocalKeyAgent) -> Self {
        Self::build(Ok(accounts), MockSigning::Key(key))
    }

    /// Agent whose account request fails
    pub fn failing_accounts(error: AgentError) -> Self {
        Self::build(
            Err(error),
            MockSigning::Fail(AgentError::Unavailable("unreachable".to_string())),
        )
    }

    /// Agent that reports `accounts` but fails every signing request
    pub fn failing_signature(accounts: Vec<String>, error: AgentError) -> Self {
        Self::build(Ok(accounts), MockSigning::Fail(error))
    }

    fn build(accounts: Result<Vec<String>, AgentError>, signing: MockSigning) -> Self {
        Self {
            accounts,
            signing,
            account_requests: AtomicUsize::new(0),
            sign_requests: AtomicUsize::new(0),
            last_sign_request: Mutex::new(None),
        }
    }

    pub fn account_requests(&self) -> usize {
        self.account_requests.load(Ordering::SeqCst)
    }

    pub fn sign_requests(&self) -> usize {
        self.sign_requests.load(Ordering::SeqCst)
    }

    /// Most recent `(hex_message, address)` passed to `personal_sign`
    pub fn last_sign_request(&self) -> Option<(String, String)> {
        self.last_sign_request
            .lock()
            .ok()
            .and_then(|guard| guard.clone())
    }
}

#[async_trait]
impl SigningAgent for MockSigningAgent {
    async fn request_accounts(&self) -> Result<Vec<String>, AgentError> {
        self.account_requests.fetch_add(1, Ordering::SeqCst);
        self.accounts.clone()
    }

    async fn personal_sign(&self, hex_message: &str, address: &str) -> Result<String, AgentError> {
        self.sign_requests.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut guard) = self.last_sign_request.lock() {
            *guard = Some((hex_message.to_string(), address.to_string()));
        }

        match &self.signing {
            MockSigning::Fixed(signature) => Ok(signature.clone()),
            MockSigning::Key(key) => key.sign_hex_message(hex_message).await,
            MockSigning::Fail(error) => Err(error.clone()),
        }
    }
}
