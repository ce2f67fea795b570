/*
[INPUT]:  Typed statement fields (domain, account, nonce, timestamps, ...)
[OUTPUT]: Validated AuthStatement value and its canonical text form
[POS]:    Message layer - the exact bytes the signature covers
[UPDATE]: When the canonical statement layout or field rules change
*/

use chrono::{DateTime, SecondsFormat, Timelike, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{HandshakeError, Result};
use crate::types::Account;

pub(crate) const PREAMBLE_SUFFIX: &str = " wants you to sign in with your Ethereum account:";
pub(crate) const URI_TAG: &str = "URI: ";
pub(crate) const VERSION_TAG: &str = "Version: ";
pub(crate) const CHAIN_ID_TAG: &str = "Chain ID: ";
pub(crate) const NONCE_TAG: &str = "Nonce: ";
pub(crate) const ISSUED_AT_TAG: &str = "Issued At: ";
pub(crate) const EXPIRATION_TIME_TAG: &str = "Expiration Time: ";
pub(crate) const NOT_BEFORE_TAG: &str = "Not Before: ";
pub(crate) const REQUEST_ID_TAG: &str = "Request ID: ";
pub(crate) const RESOURCES_TAG: &str = "Resources:";
pub(crate) const RESOURCE_ITEM_TAG: &str = "- ";

/// Sign-in statement fields
///
/// Rendering is pure: equal fields always give byte-identical text, and the
/// validation in [`AuthStatement::validate`] guarantees distinct fields never
/// render to the same text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthStatement {
    /// RFC 3986 authority requesting the sign-in (host, optionally `:port`)
    pub domain: String,
    pub address: Account,
    /// Human-readable assertion shown to the user
    pub statement: Option<String>,
    pub uri: String,
    pub version: String,
    pub chain_id: u64,
    pub nonce: String,
    pub issued_at: DateTime<Utc>,
    pub expiration_time: Option<DateTime<Utc>>,
    pub not_before: Option<DateTime<Utc>>,
    pub request_id: Option<String>,
    #[serde(default)]
    pub resources: Vec<String>,
}

impl AuthStatement {
    /// Check every field can be rendered without ambiguity
    pub fn validate(&self) -> Result<()> {
        ensure_single_line("domain", &self.domain)?;
        if self.domain.is_empty() {
            return Err(HandshakeError::invalid_field("domain", "must not be empty"));
        }
        if self.domain.chars().any(char::is_whitespace) {
            return Err(HandshakeError::invalid_field(
                "domain",
                "must not contain whitespace",
            ));
        }

        if let Some(statement) = &self.statement {
            ensure_single_line("statement", statement)?;
            if statement.is_empty() {
                return Err(HandshakeError::invalid_field(
                    "statement",
                    "must be omitted rather than empty",
                ));
            }
        }

        ensure_uri("uri", &self.uri)?;

        ensure_single_line("version", &self.version)?;
        if self.version.is_empty() || self.version.chars().any(char::is_whitespace) {
            return Err(HandshakeError::invalid_field(
                "version",
                "must be a non-empty token",
            ));
        }

        ensure_single_line("nonce", &self.nonce)?;
        if self.nonce.is_empty() || !self.nonce.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(HandshakeError::invalid_field(
                "nonce",
                "must be non-empty ASCII alphanumeric",
            ));
        }

        ensure_millisecond_precision("issuedAt", self.issued_at)?;
        if let Some(expiration_time) = self.expiration_time {
            ensure_millisecond_precision("expirationTime", expiration_time)?;
        }
        if let Some(not_before) = self.not_before {
            ensure_millisecond_precision("notBefore", not_before)?;
        }

        if let Some(expiration_time) = self.expiration_time {
            if expiration_time <= self.issued_at {
                return Err(HandshakeError::invalid_field(
                    "expirationTime",
                    "must be later than issuedAt",
                ));
            }
        }

        if let Some(request_id) = &self.request_id {
            ensure_single_line("requestId", request_id)?;
        }

        for resource in &self.resources {
            ensure_uri("resources", resource)?;
        }

        Ok(())
    }

    /// Canonical text form, the exact input to `personal_sign`
    pub fn render(&self) -> Result<String> {
        self.validate()?;

        let mut lines: Vec<String> = Vec::with_capacity(12 + self.resources.len());
        lines.push(format!("{}{PREAMBLE_SUFFIX}", self.domain));
        lines.push(self.address.checksummed());
        lines.push(String::new());

        if let Some(statement) = &self.statement {
            lines.push(statement.clone());
            lines.push(String::new());
        }

        lines.push(format!("{URI_TAG}{}", self.uri));
        lines.push(format!("{VERSION_TAG}{}", self.version));
        lines.push(format!("{CHAIN_ID_TAG}{}", self.chain_id));
        lines.push(format!("{NONCE_TAG}{}", self.nonce));
        lines.push(format!("{ISSUED_AT_TAG}{}", format_timestamp(self.issued_at)));

        if let Some(expiration_time) = self.expiration_time {
            lines.push(format!(
                "{EXPIRATION_TIME_TAG}{}",
                format_timestamp(expiration_time)
            ));
        }
        if let Some(not_before) = self.not_before {
            lines.push(format!("{NOT_BEFORE_TAG}{}", format_timestamp(not_before)));
        }
        if let Some(request_id) = &self.request_id {
            lines.push(format!("{REQUEST_ID_TAG}{request_id}"));
        }
        if !self.resources.is_empty() {
            lines.push(RESOURCES_TAG.to_string());
            for resource in &self.resources {
                lines.push(format!("{RESOURCE_ITEM_TAG}{resource}"));
            }
        }

        Ok(lines.join("\n"))
    }
}

/// ISO-8601 UTC with millisecond precision, e.g. `2021-09-30T16:25:24.000Z`
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Timestamps render with milliseconds, so finer values would be lost
fn ensure_millisecond_precision(field: &'static str, timestamp: DateTime<Utc>) -> Result<()> {
    if timestamp.nanosecond() % 1_000_000 != 0 {
        return Err(HandshakeError::invalid_field(
            field,
            "must not be more precise than milliseconds",
        ));
    }
    Ok(())
}

fn ensure_single_line(field: &'static str, value: &str) -> Result<()> {
    if value.contains(['\n', '\r']) {
        return Err(HandshakeError::invalid_field(
            field,
            "must not contain line breaks",
        ));
    }
    Ok(())
}

fn ensure_uri(field: &'static str, value: &str) -> Result<()> {
    // url's parser silently strips newlines, so check the raw text first
    ensure_single_line(field, value)?;
    if value.chars().any(char::is_whitespace) {
        return Err(HandshakeError::invalid_field(
            field,
            "must not contain whitespace",
        ));
    }
    Url::parse(value).map_err(|e| HandshakeError::invalid_field(field, e.to_string()))?;
    Ok(())
}
