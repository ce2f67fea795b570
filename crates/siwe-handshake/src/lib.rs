/*
[INPUT]:  Crate modules and public type definitions
[OUTPUT]: Public sign-in handshake crate surface
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod agent;
pub mod error;
pub mod handshake;
pub mod http;
pub mod message;
pub mod types;

pub use error::{FailureKind, HandshakeError, Recovery, Result};

// Re-export commonly used types from agent
pub use agent::{
    AccountResolver,
    AgentError,
    LocalKeyAgent,
    MockSigningAgent,
    SignedAuthRequest,
    SigningAgent,
    SigningAgentClient,
    initialize,
};

// Re-export commonly used types from handshake
pub use handshake::{
    AuthenticatedSession,
    HandshakeConfig,
    HandshakeSession,
    HandshakeState,
    HandshakeStateMachine,
};

// Re-export commonly used types from http
pub use http::{
    AuthSubmitter,
    ClientConfig,
    HttpNonceSource,
    NonceSource,
    RelyingPartyClient,
    RelyingPartyEndpoints,
    StaticNonceSource,
};

pub use message::{AuthStatement, MessageBuilder};

// Re-export all types
pub use types::*;
