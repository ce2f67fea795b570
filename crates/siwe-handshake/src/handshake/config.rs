/*
[INPUT]:  Relying-party identity and statement preferences
[OUTPUT]: Static statement fields shared by every attempt
[POS]:    Handshake layer - configuration
[UPDATE]: When adding configurable statement fields
*/

use serde::{Deserialize, Serialize};

/// Static inputs to the statement builder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandshakeConfig {
    /// Authority of the relying party, e.g. `example.com` or `127.0.0.1:8000`
    pub domain: String,
    /// URI of the resource the user signs in to
    pub uri: String,
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub statement: Option<String>,
    #[serde(default)]
    pub resources: Vec<String>,
    #[serde(default)]
    pub request_id: Option<String>,
    /// When set, statements expire this many seconds after issue
    #[serde(default)]
    pub statement_ttl_secs: Option<u64>,
}

impl HandshakeConfig {
    pub fn new(domain: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            uri: uri.into(),
            chain_id: default_chain_id(),
            version: default_version(),
            statement: None,
            resources: Vec::new(),
            request_id: None,
            statement_ttl_secs: None,
        }
    }

    pub fn with_statement(mut self, statement: impl Into<String>) -> Self {
        self.statement = Some(statement.into());
        self
    }

    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = chain_id;
        self
    }

    pub fn with_resources(mut self, resources: Vec<String>) -> Self {
        self.resources = resources;
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn with_statement_ttl_secs(mut self, ttl: u64) -> Self {
        self.statement_ttl_secs = Some(ttl);
        self
    }
}

fn default_chain_id() -> u64 {
    1
}

fn default_version() -> String {
    "1".to_string()
}
