/*
[INPUT]:  EVM private key (hex string)
[OUTPUT]: Signing agent backed by an in-process secp256k1 key
[POS]:    Agent layer - local key implementation
[UPDATE]: When signing logic or key loading changes
*/

use std::fmt;
use std::str::FromStr;

use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;

use super::signing::{decode_personal_message, format_signature};
use super::traits::{AgentError, SigningAgent};
use crate::error::{HandshakeError, Result};
use crate::types::Account;

/// Signing agent for a locally held key; it never prompts
pub struct LocalKeyAgent {
    signer: PrivateKeySigner,
    account: Account,
}

impl LocalKeyAgent {
    /// Create an agent from a hex-encoded private key
    ///
    /// Supports both "0x"-prefixed and non-prefixed hex strings.
    pub fn new(private_key_hex: &str) -> Result<Self> {
        let private_key_hex = private_key_hex.trim();
        let private_key_hex = private_key_hex
            .strip_prefix("0x")
            .unwrap_or(private_key_hex);
        let signer = PrivateKeySigner::from_str(private_key_hex)
            .map_err(|e| HandshakeError::Config(format!("Invalid EVM private key: {e}")))?;

        Ok(Self::from_signer(signer))
    }

    /// Agent with a freshly generated key
    pub fn random() -> Self {
        Self::from_signer(PrivateKeySigner::random())
    }

    fn from_signer(signer: PrivateKeySigner) -> Self {
        let account = Account::new(signer.address());
        Self { signer, account }
    }

    pub fn account(&self) -> Account {
        self.account
    }

    /// Sign without checking which account was asked for
    pub(crate) async fn sign_hex_message(&self, hex_message: &str) -> std::result::Result<String, AgentError> {
        let bytes = decode_personal_message(hex_message)
            .map_err(|e| AgentError::Unavailable(e.to_string()))?;
        let signature = self
            .signer
            .sign_message(&bytes)
            .await
            .map_err(|e| AgentError::Unavailable(format!("Failed to sign message: {e}")))?;
        Ok(format_signature(&signature))
    }
}

impl fmt::Debug for LocalKeyAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalKeyAgent")
            .field("account", &self.account)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl SigningAgent for LocalKeyAgent {
    async fn request_accounts(&self) -> std::result::Result<Vec<String>, AgentError> {
        Ok(vec![self.account.checksummed()])
    }

    async fn personal_sign(
        &self,
        hex_message: &str,
        address: &str,
    ) -> std::result::Result<String, AgentError> {
        let requested: Account = address
            .parse()
            .map_err(|_| AgentError::Unauthorized(address.to_string()))?;
        if requested != self.account {
            return Err(AgentError::Unauthorized(address.to_string()));
        }

        self.sign_hex_message(hex_message).await
    }
}
