/*
[INPUT]:  Account and signing requests from the handshake
[OUTPUT]: Agent responses or classified agent failures
[POS]:    Agent layer - external key-holder abstraction
[UPDATE]: When the agent request surface or error codes change
*/

use async_trait::async_trait;
use thiserror::Error;

/// EIP-1193 provider error codes
pub const USER_REJECTED_REQUEST: i64 = 4001;
pub const UNAUTHORIZED: i64 = 4100;
pub const DISCONNECTED: i64 = 4900;
pub const CHAIN_DISCONNECTED: i64 = 4901;

/// Failure reported by a signing agent
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgentError {
    /// Agent missing, disconnected or otherwise unable to serve the request
    #[error("agent unavailable: {0}")]
    Unavailable(String),

    /// The user dismissed the prompt
    #[error("request declined by user")]
    Declined,

    /// The requested account is not authorized in the agent
    #[error("account not authorized: {0}")]
    Unauthorized(String),
}

impl AgentError {
    /// Classify an EIP-1193 provider error
    pub fn from_rpc_code(code: i64, message: impl Into<String>) -> Self {
        let message = message.into();
        match code {
            USER_REJECTED_REQUEST => AgentError::Declined,
            UNAUTHORIZED => AgentError::Unauthorized(message),
            DISCONNECTED | CHAIN_DISCONNECTED => AgentError::Unavailable(message),
            _ => AgentError::Unavailable(format!("provider error {code}: {message}")),
        }
    }
}

/// External agent holding the account keys (browser wallet, hardware wallet,
/// local key file, ...)
///
/// Both calls may suspend on user interaction.
#[async_trait]
pub trait SigningAgent: Send + Sync {
    /// `eth_requestAccounts`: authorized addresses, active account first
    async fn request_accounts(&self) -> Result<Vec<String>, AgentError>;

    /// `personal_sign`: EIP-191 signature over `hex_message` by `address`,
    /// returned as `0x`-prefixed hex
    async fn personal_sign(&self, hex_message: &str, address: &str) -> Result<String, AgentError>;
}
