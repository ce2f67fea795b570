/*
[INPUT]:  Challenge values issued by the relying party
[OUTPUT]: Validated single-use nonce with issue and expiry timestamps
[POS]:    Data layer - replay protection challenge
[UPDATE]: When nonce format rules or lifetime handling changes
*/

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::{Deserialize, Serialize};

use crate::error::{HandshakeError, Result};

/// Minimum nonce length accepted in a sign-in statement
pub const MIN_NONCE_LEN: usize = 8;

const GENERATED_NONCE_LEN: usize = 17;

/// Single-use challenge binding a statement to one sign-in attempt
///
/// The relying party owns and invalidates nonces; the client only carries them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawNonce")]
pub struct Nonce {
    value: String,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl Nonce {
    pub fn new(
        value: impl Into<String>,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<Self> {
        let value = value.into();
        validate_nonce_value(&value)?;
        if expires_at <= issued_at {
            return Err(HandshakeError::invalid_field(
                "nonce",
                "expiry must be later than issue time",
            ));
        }

        Ok(Self {
            value,
            issued_at,
            expires_at,
        })
    }

    /// Random alphanumeric nonce valid for `ttl` from now
    pub fn generate(ttl: Duration) -> Self {
        let value: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(GENERATED_NONCE_LEN)
            .map(char::from)
            .collect();
        let issued_at = Utc::now();
        Self {
            value,
            issued_at,
            expires_at: issued_at + ttl,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// EIP-4361 nonces are at least 8 ASCII alphanumeric characters
pub fn validate_nonce_value(value: &str) -> Result<()> {
    if value.len() < MIN_NONCE_LEN {
        return Err(HandshakeError::invalid_field(
            "nonce",
            format!("must be at least {MIN_NONCE_LEN} characters"),
        ));
    }
    if !value.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(HandshakeError::invalid_field(
            "nonce",
            "must be ASCII alphanumeric",
        ));
    }
    Ok(())
}

/// Unchecked wire form; deserialization goes through [`Nonce::new`]
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNonce {
    value: String,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl TryFrom<RawNonce> for Nonce {
    type Error = HandshakeError;

    fn try_from(raw: RawNonce) -> Result<Self> {
        Nonce::new(raw.value, raw.issued_at, raw.expires_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_valid_and_unpredictable() {
        let a = Nonce::generate(Duration::minutes(5));
        let b = Nonce::generate(Duration::minutes(5));
        assert!(validate_nonce_value(a.value()).is_ok());
        assert_eq!(a.value().len(), GENERATED_NONCE_LEN);
        assert_ne!(a.value(), b.value());
        assert!(!a.is_expired_at(Utc::now()));
    }

    #[test]
    fn test_rejects_short_nonce() {
        let now = Utc::now();
        let err = Nonce::new("abc123", now, now + Duration::minutes(1)).unwrap_err();
        assert!(matches!(err, HandshakeError::InvalidField { field: "nonce", .. }));
    }

    #[test]
    fn test_rejects_non_alphanumeric_nonce() {
        let now = Utc::now();
        assert!(Nonce::new("abcd-1234", now, now + Duration::minutes(1)).is_err());
        assert!(Nonce::new("abcd1234\nURI: x", now, now + Duration::minutes(1)).is_err());
    }

    #[test]
    fn test_rejects_inverted_lifetime() {
        let now = Utc::now();
        assert!(Nonce::new("32891757", now, now).is_err());
    }

    #[test]
    fn test_expiry() {
        let now = Utc::now();
        let nonce = Nonce::new("32891757", now, now + Duration::seconds(30)).unwrap();
        assert!(!nonce.is_expired_at(now));
        assert!(nonce.is_expired_at(now + Duration::seconds(30)));
    }

    #[test]
    fn test_deserialize_applies_validation() {
        let valid = r#"{"value":"32891757","issuedAt":"2021-09-30T16:25:24Z","expiresAt":"2021-09-30T16:35:24Z"}"#;
        let nonce: Nonce = serde_json::from_str(valid).unwrap();
        assert_eq!(nonce.value(), "32891757");

        let short = r#"{"value":"abc123","issuedAt":"2021-09-30T16:25:24Z","expiresAt":"2021-09-30T16:35:24Z"}"#;
        assert!(serde_json::from_str::<Nonce>(short).is_err());

        let inverted = r#"{"value":"32891757","issuedAt":"2021-09-30T16:35:24Z","expiresAt":"2021-09-30T16:25:24Z"}"#;
        assert!(serde_json::from_str::<Nonce>(inverted).is_err());
    }
}
