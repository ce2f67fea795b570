/*
[INPUT]:  Canonical statement text
[OUTPUT]: AuthStatement fields recovered from the text
[POS]:    Message layer - inverse of rendering
[UPDATE]: When the canonical statement layout changes
*/

use std::str::FromStr;

use chrono::{DateTime, Utc};

use super::statement::{
    AuthStatement, CHAIN_ID_TAG, EXPIRATION_TIME_TAG, ISSUED_AT_TAG, NONCE_TAG, NOT_BEFORE_TAG,
    PREAMBLE_SUFFIX, REQUEST_ID_TAG, RESOURCE_ITEM_TAG, RESOURCES_TAG, URI_TAG, VERSION_TAG,
};
use crate::error::{HandshakeError, Result};
use crate::types::Account;

impl FromStr for AuthStatement {
    type Err = HandshakeError;

    /// Parse canonical text; anything that does not re-render to the exact
    /// same bytes is rejected.
    fn from_str(s: &str) -> Result<Self> {
        let mut lines = s.split('\n').peekable();

        let preamble = next_line(&mut lines, "domain")?;
        let domain = preamble
            .strip_suffix(PREAMBLE_SUFFIX)
            .ok_or_else(|| malformed("domain", "missing sign-in preamble"))?
            .to_string();

        let address: Account = next_line(&mut lines, "address")?.parse()?;
        expect_blank(&mut lines, "address")?;

        // A statement line is always followed by a blank line; URI never is.
        let mut statement = None;
        let first = next_line(&mut lines, "uri")?;
        let uri_line = if lines.peek() == Some(&"") {
            statement = Some(first.to_string());
            lines.next();
            next_line(&mut lines, "uri")?
        } else {
            first
        };

        let uri = tagged(uri_line, URI_TAG, "uri")?.to_string();
        let version = tagged(next_line(&mut lines, "version")?, VERSION_TAG, "version")?.to_string();
        let chain_id = tagged(next_line(&mut lines, "chainId")?, CHAIN_ID_TAG, "chainId")?
            .parse::<u64>()
            .map_err(|e| malformed("chainId", &e.to_string()))?;
        let nonce = tagged(next_line(&mut lines, "nonce")?, NONCE_TAG, "nonce")?.to_string();
        let issued_at = parse_timestamp(
            tagged(next_line(&mut lines, "issuedAt")?, ISSUED_AT_TAG, "issuedAt")?,
            "issuedAt",
        )?;

        let expiration_time = optional_tagged(&mut lines, EXPIRATION_TIME_TAG)
            .map(|value| parse_timestamp(value, "expirationTime"))
            .transpose()?;
        let not_before = optional_tagged(&mut lines, NOT_BEFORE_TAG)
            .map(|value| parse_timestamp(value, "notBefore"))
            .transpose()?;
        let request_id = optional_tagged(&mut lines, REQUEST_ID_TAG).map(str::to_string);

        let mut resources = Vec::new();
        if lines.peek() == Some(&RESOURCES_TAG) {
            lines.next();
            for line in lines.by_ref() {
                resources.push(tagged(line, RESOURCE_ITEM_TAG, "resources")?.to_string());
            }
            if resources.is_empty() {
                return Err(malformed("resources", "empty resource list"));
            }
        }

        if let Some(extra) = lines.next() {
            return Err(malformed("message", &format!("unexpected line `{extra}`")));
        }

        let parsed = AuthStatement {
            domain,
            address,
            statement,
            uri,
            version,
            chain_id,
            nonce,
            issued_at,
            expiration_time,
            not_before,
            request_id,
            resources,
        };

        if parsed.render()? != s {
            return Err(malformed("message", "not in canonical form"));
        }
        Ok(parsed)
    }
}

fn malformed(field: &'static str, reason: &str) -> HandshakeError {
    HandshakeError::invalid_field(field, reason.to_string())
}

fn next_line<'a, I>(lines: &mut I, field: &'static str) -> Result<&'a str>
where
    I: Iterator<Item = &'a str>,
{
    lines
        .next()
        .ok_or_else(|| malformed(field, "message ended early"))
}

fn expect_blank<'a, I>(lines: &mut I, after: &'static str) -> Result<()>
where
    I: Iterator<Item = &'a str>,
{
    match lines.next() {
        Some("") => Ok(()),
        _ => Err(malformed(after, "expected blank line")),
    }
}

fn tagged<'a>(line: &'a str, tag: &str, field: &'static str) -> Result<&'a str> {
    line.strip_prefix(tag)
        .ok_or_else(|| malformed(field, &format!("expected `{}`", tag.trim_end())))
}

fn optional_tagged<'a, I>(lines: &mut std::iter::Peekable<I>, tag: &str) -> Option<&'a str>
where
    I: Iterator<Item = &'a str>,
{
    let line: &'a str = lines.peek().copied()?;
    let value = line.strip_prefix(tag)?;
    lines.next();
    Some(value)
}

fn parse_timestamp(value: &str, field: &'static str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|e| malformed(field, &e.to_string()))
}
