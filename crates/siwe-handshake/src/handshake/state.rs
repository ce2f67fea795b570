/*
[INPUT]:  Current handshake state and requested next state
[OUTPUT]: Validated linear transitions
[POS]:    Handshake layer - state definitions
[UPDATE]: When adding handshake states
*/

use std::fmt;

use crate::error::FailureKind;

/// Externally observable progress of one sign-in attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandshakeState {
    Idle,
    AccountResolving,
    AccountResolved,
    Building,
    Signing,
    Submitting,
    Authenticated,
    Failed(FailureKind),
}

impl HandshakeState {
    pub fn is_terminal(self) -> bool {
        matches!(self, HandshakeState::Authenticated | HandshakeState::Failed(_))
    }

    /// Transitions are strictly forward; any non-terminal state may fail
    pub fn can_transition(self, next: HandshakeState) -> bool {
        use HandshakeState::*;

        match (self, next) {
            (from, _) if from.is_terminal() => false,
            (_, Failed(_)) => true,
            (Idle, AccountResolving)
            | (AccountResolving, AccountResolved)
            | (AccountResolved, Building)
            | (Building, Signing)
            | (Signing, Submitting)
            | (Submitting, Authenticated) => true,
            _ => false,
        }
    }
}

impl fmt::Display for HandshakeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandshakeState::Failed(kind) => write!(f, "Failed({kind})"),
            other => fmt::Debug::fmt(other, f),
        }
    }
}
