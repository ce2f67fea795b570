/*
[INPUT]:  YAML configuration file, SIWE_* environment variables
[OUTPUT]: Parsed relying-party, handshake and agent configuration
[POS]:    Configuration layer - binary setup
[UPDATE]: When adding new configuration options
*/

use std::fmt;
use std::time::Duration;

use config::{Config, Environment, File, FileFormat, Source};
use serde::{Deserialize, Serialize};
use siwe_handshake::{ClientConfig, HandshakeConfig, RelyingPartyEndpoints};

/// Prefix for environment overrides, e.g. `SIWE_AGENT__PRIVATE_KEY`
pub const ENV_PREFIX: &str = "SIWE";

/// Top-level configuration for the sign-in client
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CliConfig {
    pub relying_party: RelyingPartyConfig,
    /// Statement fields
    pub handshake: HandshakeConfig,
    #[serde(default)]
    pub agent: AgentConfig,
}

/// Where the relying party lives and how to reach it
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RelyingPartyConfig {
    /// Base URL, e.g. `http://127.0.0.1:8000` or `https://host/app/`
    pub base_url: String,
    #[serde(default)]
    pub endpoints: RelyingPartyEndpoints,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

/// Local signing agent settings
#[derive(Clone, Default, Deserialize, Serialize)]
pub struct AgentConfig {
    /// Hex secp256k1 key; prefer setting it through `SIWE_AGENT__PRIVATE_KEY`
    #[serde(default)]
    pub private_key: Option<String>,
}

impl fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentConfig")
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

impl RelyingPartyConfig {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            timeout: Duration::from_secs(self.timeout_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
        }
    }
}

impl CliConfig {
    /// Load configuration from a YAML file, then apply `SIWE_*` overrides
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        Self::load(
            File::new(path, FileFormat::Yaml),
            Environment::with_prefix(ENV_PREFIX),
        )
    }

    fn load<S>(file: S, env: Environment) -> anyhow::Result<Self>
    where
        S: Source + Send + Sync + 'static,
    {
        let config = Config::builder()
            .add_source(file)
            .add_source(
                env.prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        Ok(config.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
relying_party:
  base_url: "http://127.0.0.1:8000"
  endpoints:
    nonce: "/api/nonce"
handshake:
  domain: "127.0.0.1:8000"
  uri: "https://127.0.0.1:8000"
  statement: "I accept the Terms of Service: https://127.0.0.1:8000/tos"
  statement_ttl_secs: 300
"#;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map: config::Map<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Environment::with_prefix(ENV_PREFIX).source(Some(map))
    }

    #[test]
    fn test_load_yaml_with_defaults() {
        let config = CliConfig::load(File::from_str(YAML, FileFormat::Yaml), env(&[])).unwrap();

        assert_eq!(config.relying_party.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.relying_party.endpoints.nonce, "/api/nonce");
        assert_eq!(config.relying_party.endpoints.login, "./");
        assert_eq!(config.relying_party.timeout_secs, 30);
        assert_eq!(config.handshake.chain_id, 1);
        assert_eq!(config.handshake.version, "1");
        assert_eq!(config.handshake.statement_ttl_secs, Some(300));
        assert!(config.agent.private_key.is_none());

        let client = config.relying_party.client_config();
        assert_eq!(client.connect_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_environment_overrides_file() {
        let config = CliConfig::load(
            File::from_str(YAML, FileFormat::Yaml),
            env(&[
                ("SIWE_HANDSHAKE__CHAIN_ID", "56"),
                ("SIWE_RELYING_PARTY__BASE_URL", "https://login.example.com"),
                (
                    "SIWE_AGENT__PRIVATE_KEY",
                    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
                ),
            ]),
        )
        .unwrap();

        assert_eq!(config.handshake.chain_id, 56);
        assert_eq!(config.relying_party.base_url, "https://login.example.com");
        assert!(config.agent.private_key.is_some());
        assert!(!format!("{:?}", config.agent).contains("ac0974"));
    }

    #[test]
    fn test_missing_relying_party_is_an_error() {
        let yaml = "handshake:\n  domain: localhost\n  uri: http://localhost/\n";
        assert!(CliConfig::load(File::from_str(yaml, FileFormat::Yaml), env(&[])).is_err());
    }
}
