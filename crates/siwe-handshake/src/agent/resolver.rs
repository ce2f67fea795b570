/*
[INPUT]:  Optional signing agent handle
[OUTPUT]: The account the agent authorized for this sign-in attempt
[POS]:    Agent layer - account authorization (eth_requestAccounts)
[UPDATE]: When account selection or authorization error mapping changes
*/

use std::sync::Arc;

use tracing::{info, warn};

use super::traits::{AgentError, SigningAgent};
use crate::error::{HandshakeError, Result};
use crate::types::Account;

/// Obtains the currently authorized account from the signing agent
///
/// The first successful resolution is cached; later calls return the same
/// account without prompting the agent again.
#[derive(Clone)]
pub struct AccountResolver {
    agent: Option<Arc<dyn SigningAgent>>,
    account: Option<Account>,
}

impl AccountResolver {
    /// `None` means no agent was detected in this environment
    pub fn new(agent: Option<Arc<dyn SigningAgent>>) -> Self {
        Self {
            agent,
            account: None,
        }
    }

    pub fn agent(&self) -> Option<Arc<dyn SigningAgent>> {
        self.agent.clone()
    }

    /// Cached account, if already resolved
    pub fn account(&self) -> Option<Account> {
        self.account
    }

    pub async fn resolve(&mut self) -> Result<Account> {
        if let Some(account) = self.account {
            return Ok(account);
        }

        let agent = self.agent.as_ref().ok_or_else(|| {
            HandshakeError::AgentUnavailable("no signing agent detected".to_string())
        })?;

        let accounts = agent.request_accounts().await.map_err(|e| {
            warn!(error = %e, "account authorization failed");
            match e {
                AgentError::Unavailable(reason) => HandshakeError::AgentUnavailable(reason),
                AgentError::Declined => HandshakeError::UserDeclined,
                AgentError::Unauthorized(_) => HandshakeError::NoAuthorizedAccounts,
            }
        })?;

        let first = accounts
            .first()
            .ok_or(HandshakeError::NoAuthorizedAccounts)?;
        let account: Account = first.parse().map_err(|_| {
            HandshakeError::InvalidResponse(format!("agent reported malformed address `{first}`"))
        })?;

        info!(address = %account, available = accounts.len(), "account resolved");
        self.account = Some(account);
        Ok(account)
    }
}

impl std::fmt::Debug for AccountResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountResolver")
            .field("agent_present", &self.agent.is_some())
            .field("account", &self.account)
            .finish()
    }
}

/// Detect the agent and request account authorization up front
///
/// Returns a resolver that already holds the authorized account.
pub async fn initialize(agent: Option<Arc<dyn SigningAgent>>) -> Result<AccountResolver> {
    let mut resolver = AccountResolver::new(agent);
    resolver.resolve().await?;
    Ok(resolver)
}
