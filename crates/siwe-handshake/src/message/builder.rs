/*
[INPUT]:  Handshake configuration, resolved account, issued nonce
[OUTPUT]: AuthStatement values and their canonical rendering
[POS]:    Message layer - statement construction for one attempt
[UPDATE]: When statement defaults or time handling change
*/

use chrono::{DateTime, Duration, SubsecRound, Utc};

use super::AuthStatement;
use crate::error::{HandshakeError, Result};
use crate::handshake::HandshakeConfig;
use crate::types::{Account, Nonce};

/// Builds sign-in statements from static configuration plus per-attempt inputs
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    config: HandshakeConfig,
}

impl MessageBuilder {
    pub fn new(config: HandshakeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &HandshakeConfig {
        &self.config
    }

    /// Assemble and validate the statement for one attempt
    pub fn build(
        &self,
        account: Account,
        nonce: &Nonce,
        issued_at: DateTime<Utc>,
    ) -> Result<AuthStatement> {
        // Rendered timestamps carry milliseconds; drop anything finer
        let issued_at = issued_at.trunc_subsecs(3);
        if nonce.is_expired_at(issued_at) {
            return Err(HandshakeError::invalid_field(
                "nonce",
                format!("expired at {}", nonce.expires_at()),
            ));
        }

        let expiration_time = self
            .config
            .statement_ttl_secs
            .map(|ttl| expiration_after(issued_at, ttl))
            .transpose()?;

        let statement = AuthStatement {
            domain: self.config.domain.clone(),
            address: account,
            statement: self.config.statement.clone(),
            uri: self.config.uri.clone(),
            version: self.config.version.clone(),
            chain_id: self.config.chain_id,
            nonce: nonce.value().to_string(),
            issued_at,
            expiration_time,
            not_before: None,
            request_id: self.config.request_id.clone(),
            resources: self.config.resources.clone(),
        };
        statement.validate()?;
        Ok(statement)
    }

    /// Render statement fields to their canonical text
    pub fn render(fields: &AuthStatement) -> Result<String> {
        fields.render()
    }
}

fn expiration_after(issued_at: DateTime<Utc>, ttl_secs: u64) -> Result<DateTime<Utc>> {
    i64::try_from(ttl_secs)
        .ok()
        .and_then(Duration::try_seconds)
        .and_then(|ttl| issued_at.checked_add_signed(ttl))
        .ok_or_else(|| {
            HandshakeError::invalid_field(
                "expirationTime",
                format!("statement ttl of {ttl_secs}s is out of range"),
            )
        })
}
