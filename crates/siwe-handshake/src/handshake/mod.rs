/*
[INPUT]:  Handshake configuration and the agent / nonce / relying-party components
[OUTPUT]: One linear sign-in attempt with observable state
[POS]:    Handshake layer - orchestration
[UPDATE]: When handshake states or orchestration order change
*/

pub mod config;
pub mod machine;
pub mod session;
pub mod state;

pub use config::HandshakeConfig;
pub use machine::{AuthenticatedSession, HandshakeStateMachine};
pub use session::HandshakeSession;
pub use state::HandshakeState;
