/*
[INPUT]:  Resolved account, rendered statement, signing agent handle
[OUTPUT]: Agent signatures and SignedAuthRequest values bound to their signer
[POS]:    Agent layer - personal_sign protocol and signer recovery
[UPDATE]: When the personal-message encoding or signature format changes
*/

use std::sync::Arc;

use alloy_primitives::{B256, Signature, eip191_hash_message};
use tracing::{debug, info};

use super::traits::{AgentError, SigningAgent};
use crate::error::{HandshakeError, Result};
use crate::message::AuthStatement;
use crate::types::{Account, LoginRequest};

const SIGNATURE_LEN: usize = 65;

/// `0x`-prefixed hex of the message's UTF-8 bytes, as `personal_sign` expects
pub fn encode_personal_message(message: &str) -> String {
    format!("0x{}", hex::encode(message.as_bytes()))
}

pub fn decode_personal_message(hex_message: &str) -> Result<Vec<u8>> {
    let digits = hex_message
        .strip_prefix("0x")
        .ok_or_else(|| HandshakeError::invalid_field("message", "missing 0x prefix"))?;
    hex::decode(digits).map_err(|e| HandshakeError::invalid_field("message", e.to_string()))
}

/// EIP-191 digest: keccak256("\x19Ethereum Signed Message:\n" + len + message)
pub fn personal_message_hash(message: &[u8]) -> B256 {
    eip191_hash_message(message)
}

/// Parse a 65-byte `[r, s, v]` signature from `0x`-prefixed hex
pub fn parse_signature(signature_hex: &str) -> Result<Signature> {
    let digits = signature_hex
        .trim()
        .strip_prefix("0x")
        .ok_or_else(|| HandshakeError::InvalidResponse("signature missing 0x prefix".to_string()))?;
    let bytes = hex::decode(digits)
        .map_err(|e| HandshakeError::InvalidResponse(format!("signature is not hex: {e}")))?;
    if bytes.len() != SIGNATURE_LEN {
        return Err(HandshakeError::InvalidResponse(format!(
            "signature must be {SIGNATURE_LEN} bytes, got {}",
            bytes.len()
        )));
    }

    Signature::try_from(bytes.as_slice())
        .map_err(|e| HandshakeError::InvalidResponse(format!("malformed signature: {e}")))
}

pub fn format_signature(signature: &Signature) -> String {
    format!("0x{}", hex::encode(signature.as_bytes()))
}

/// Address that produced `signature` over the personal message `message`
pub fn recover_signer(message: &str, signature: &Signature) -> Result<Account> {
    signature
        .recover_address_from_msg(message.as_bytes())
        .map(Account::new)
        .map_err(|e| HandshakeError::InvalidResponse(format!("signature recovery failed: {e}")))
}

/// Requests personal-message signatures from the agent
#[derive(Clone)]
pub struct SigningAgentClient {
    agent: Option<Arc<dyn SigningAgent>>,
}

impl SigningAgentClient {
    pub fn new(agent: Option<Arc<dyn SigningAgent>>) -> Self {
        Self { agent }
    }

    /// Ask the agent to sign `message` with `account`
    ///
    /// The returned signature is not checked against `account` here; that
    /// binding happens in [`SignedAuthRequest::bind`].
    pub async fn sign(&self, account: &Account, message: &str) -> Result<Signature> {
        let agent = self.agent.as_ref().ok_or_else(|| {
            HandshakeError::AgentUnavailable("no signing agent detected".to_string())
        })?;

        let hex_message = encode_personal_message(message);
        debug!(address = %account, bytes = message.len(), "requesting personal_sign");

        let signature_hex = agent
            .personal_sign(&hex_message, &account.checksummed())
            .await
            .map_err(|e| match e {
                AgentError::Declined => HandshakeError::UserRejected,
                AgentError::Unavailable(reason) => HandshakeError::AgentUnavailable(reason),
                AgentError::Unauthorized(address) => HandshakeError::AddressMismatch {
                    expected: account.checksummed(),
                    actual: address,
                },
            })?;

        let signature = parse_signature(&signature_hex)?;
        info!(address = %account, "statement signed");
        Ok(signature)
    }
}

impl std::fmt::Debug for SigningAgentClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningAgentClient")
            .field("agent_present", &self.agent.is_some())
            .finish()
    }
}

/// Statement plus a signature proven to come from the statement's address
///
/// Only [`SignedAuthRequest::bind`] constructs this type, so holding one means
/// the signer recovery check already passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedAuthRequest {
    statement: AuthStatement,
    message: String,
    signature: Signature,
}

impl SignedAuthRequest {
    pub fn bind(statement: AuthStatement, signature: Signature) -> Result<Self> {
        let message = statement.render()?;
        let signer = recover_signer(&message, &signature)?;
        if signer != statement.address {
            return Err(HandshakeError::AddressMismatch {
                expected: statement.address.checksummed(),
                actual: signer.checksummed(),
            });
        }

        Ok(Self {
            statement,
            message,
            signature,
        })
    }

    pub fn statement(&self) -> &AuthStatement {
        &self.statement
    }

    /// Rendered statement text the signature covers
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn to_login_request(&self) -> LoginRequest {
        LoginRequest {
            message: encode_personal_message(&self.message),
            signature: format_signature(&self.signature),
        }
    }
}
