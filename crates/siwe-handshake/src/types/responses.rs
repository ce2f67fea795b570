/*
[INPUT]:  Relying-party JSON and raw HTTP responses
[OUTPUT]: Typed nonce challenges and submission results
[POS]:    Data layer - response wire types
[UPDATE]: When relying-party response formats change
*/

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Challenge returned by the nonce endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NonceResponse {
    pub nonce: String,
    #[serde(default)]
    pub issued_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Successful sign-in submission
///
/// Whatever the relying party does on success (e.g. cookie issuance) is opaque
/// here; the body is kept for the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitResult {
    pub status: u16,
    pub body: String,
}

/// Response from the session authorization probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationStatus {
    pub authorized: bool,
}
