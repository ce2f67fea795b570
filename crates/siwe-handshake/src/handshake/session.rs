/*
[INPUT]:  State transitions and failures from the state machine
[OUTPUT]: Current state, last error, transition history, watch channel
[POS]:    Handshake layer - client-observable session for one attempt
[UPDATE]: When the observable session surface changes
*/

use tokio::sync::watch;
use tracing::{info, warn};

use super::HandshakeState;
use crate::error::{HandshakeError, Result};
use crate::types::Account;

/// Client-observable record of one sign-in attempt
///
/// Created fresh per attempt and never persisted.
#[derive(Debug)]
pub struct HandshakeSession {
    state: HandshakeState,
    last_error: Option<HandshakeError>,
    account: Option<Account>,
    history: Vec<HandshakeState>,
    notifier: watch::Sender<HandshakeState>,
}

impl HandshakeSession {
    pub fn new() -> Self {
        let (notifier, _) = watch::channel(HandshakeState::Idle);
        Self {
            state: HandshakeState::Idle,
            last_error: None,
            account: None,
            history: vec![HandshakeState::Idle],
            notifier,
        }
    }

    pub fn state(&self) -> HandshakeState {
        self.state
    }

    pub fn last_error(&self) -> Option<&HandshakeError> {
        self.last_error.as_ref()
    }

    /// Account resolved for this attempt, once known
    pub fn account(&self) -> Option<Account> {
        self.account
    }

    /// Every state entered so far, starting with `Idle`
    pub fn history(&self) -> &[HandshakeState] {
        &self.history
    }

    /// Receive state changes as they happen
    pub fn subscribe(&self) -> watch::Receiver<HandshakeState> {
        self.notifier.subscribe()
    }

    pub(crate) fn set_account(&mut self, account: Account) {
        self.account = Some(account);
    }

    pub(crate) fn transition(&mut self, next: HandshakeState) -> Result<()> {
        if !self.state.can_transition(next) {
            return Err(HandshakeError::InvalidState {
                from: self.state,
                to: next,
            });
        }

        info!(from = %self.state, to = %next, "handshake transition");
        self.enter(next);
        Ok(())
    }

    /// Move to `Failed` and record the error; returns it for propagation
    pub(crate) fn fail(&mut self, error: HandshakeError) -> HandshakeError {
        let next = HandshakeState::Failed(error.kind());
        if self.state.can_transition(next) {
            warn!(from = %self.state, error = %error, "handshake failed");
            self.enter(next);
            self.last_error = Some(error.clone());
        }
        error
    }

    fn enter(&mut self, next: HandshakeState) {
        self.state = next;
        self.history.push(next);
        self.notifier.send_replace(next);
    }
}

impl Default for HandshakeSession {
    fn default() -> Self {
        Self::new()
    }
}
