/*
[INPUT]:  Relying-party base URL, endpoint paths, client timeouts
[OUTPUT]: Nonce challenges, sign-in submission results, session probes
[POS]:    HTTP layer - relying-party communication
[UPDATE]: When adding endpoints or changing the submission contract
*/

pub mod client;
pub mod nonce;
pub mod submit;

pub use client::{ClientConfig, RelyingPartyClient, RelyingPartyEndpoints};
pub use nonce::{DEFAULT_NONCE_TTL_SECS, HttpNonceSource, NonceSource, StaticNonceSource};
pub use submit::AuthSubmitter;
