/*
[INPUT]:  Wallet addresses, relying-party challenge payloads
[OUTPUT]: Typed value objects shared by every handshake component
[POS]:    Data layer - type definitions
[UPDATE]: When adding new value types or wire payloads
*/

pub mod account;
pub mod nonce;
pub mod requests;
pub mod responses;

pub use account::Account;
pub use nonce::Nonce;
pub use requests::LoginRequest;
pub use responses::{AuthorizationStatus, NonceResponse, SubmitResult};
