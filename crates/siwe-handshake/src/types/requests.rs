/*
[INPUT]:  Rendered statement and agent signature
[OUTPUT]: Serializable payloads sent to the relying party
[POS]:    Data layer - request wire types
[UPDATE]: When the relying-party submission contract changes
*/

use serde::{Deserialize, Serialize};

/// Body of the sign-in submission
///
/// `message` carries the statement as `0x`-prefixed hex of its UTF-8 bytes,
/// the same encoding handed to `personal_sign`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub message: String,
    pub signature: String,
}
