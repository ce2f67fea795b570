/*
[INPUT]:  Account resolver, nonce source, message builder, signing client, submitter
[OUTPUT]: AuthenticatedSession or a typed terminal failure
[POS]:    Handshake layer - orchestrates one sign-in attempt end to end
[UPDATE]: When handshake steps, gating, or cancellation mapping change
*/

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::{HandshakeConfig, HandshakeSession, HandshakeState};
use crate::agent::{AccountResolver, SignedAuthRequest, SigningAgent, SigningAgentClient};
use crate::error::{HandshakeError, Result};
use crate::http::{AuthSubmitter, NonceSource};
use crate::message::MessageBuilder;
use crate::types::{Account, SubmitResult};

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Outcome of a successful attempt
#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
    pub account: Account,
    pub request: SignedAuthRequest,
    pub response: SubmitResult,
}

/// Drives one sign-in attempt through
/// `Idle -> AccountResolving -> AccountResolved -> Building -> Signing -> Submitting -> Authenticated`
///
/// Each step runs only after the previous one succeeded. The first failure is
/// terminal and no further component is called. A machine runs once; retrying
/// means building a new machine, which fetches a new nonce.
///
/// At most one attempt may be in flight per session. The caller is responsible
/// for not starting a second machine while one is running (e.g. on double click).
pub struct HandshakeStateMachine {
    session: HandshakeSession,
    resolver: AccountResolver,
    nonce_source: Arc<dyn NonceSource>,
    builder: MessageBuilder,
    signer: SigningAgentClient,
    submitter: AuthSubmitter,
    cancel: CancellationToken,
    clock: Clock,
}

impl HandshakeStateMachine {
    /// `agent` is `None` when no signing agent was detected
    pub fn new(
        config: HandshakeConfig,
        agent: Option<Arc<dyn SigningAgent>>,
        nonce_source: Arc<dyn NonceSource>,
        submitter: AuthSubmitter,
    ) -> Self {
        Self::with_resolver(config, AccountResolver::new(agent), nonce_source, submitter)
    }

    /// Reuse a resolver from [`crate::agent::initialize`]; its cached account
    /// is used without prompting again.
    pub fn with_resolver(
        config: HandshakeConfig,
        resolver: AccountResolver,
        nonce_source: Arc<dyn NonceSource>,
        submitter: AuthSubmitter,
    ) -> Self {
        let signer = SigningAgentClient::new(resolver.agent());
        Self {
            session: HandshakeSession::new(),
            resolver,
            nonce_source,
            builder: MessageBuilder::new(config),
            signer,
            submitter,
            cancel: CancellationToken::new(),
            clock: Arc::new(Utc::now),
        }
    }

    /// Abandon the attempt when `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Override the time source used for `Issued At`
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn session(&self) -> &HandshakeSession {
        &self.session
    }

    pub fn state(&self) -> HandshakeState {
        self.session.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<HandshakeState> {
        self.session.subscribe()
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run the attempt to a terminal state
    pub async fn run(&mut self) -> Result<AuthenticatedSession> {
        let state = self.session.state();
        if state != HandshakeState::Idle {
            return Err(HandshakeError::InvalidState {
                from: state,
                to: HandshakeState::AccountResolving,
            });
        }

        match self.drive().await {
            Ok(authenticated) => Ok(authenticated),
            Err(err) => Err(self.session.fail(err)),
        }
    }

    async fn drive(&mut self) -> Result<AuthenticatedSession> {
        self.session.transition(HandshakeState::AccountResolving)?;
        let account = cancellable(
            &self.cancel,
            HandshakeError::UserDeclined,
            self.resolver.resolve(),
        )
        .await?;
        self.session.set_account(account);
        self.session.transition(HandshakeState::AccountResolved)?;

        self.session.transition(HandshakeState::Building)?;
        let nonce = cancellable(
            &self.cancel,
            HandshakeError::NetworkError("nonce request cancelled".to_string()),
            self.nonce_source.issue(),
        )
        .await?;
        let statement = self.builder.build(account, &nonce, (self.clock)())?;
        let message = statement.render()?;

        self.session.transition(HandshakeState::Signing)?;
        let signature = cancellable(
            &self.cancel,
            HandshakeError::UserRejected,
            self.signer.sign(&account, &message),
        )
        .await?;
        let request = SignedAuthRequest::bind(statement, signature)?;

        self.session.transition(HandshakeState::Submitting)?;
        let response = cancellable(
            &self.cancel,
            HandshakeError::NetworkError("submission cancelled".to_string()),
            self.submitter.submit(&request),
        )
        .await?;

        self.session.transition(HandshakeState::Authenticated)?;
        info!(address = %account, "sign-in complete");

        Ok(AuthenticatedSession {
            account,
            request,
            response,
        })
    }
}

/// Race `step` against the user abandoning the flow
async fn cancellable<T>(
    token: &CancellationToken,
    on_cancel: HandshakeError,
    step: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(on_cancel),
        result = step => result,
    }
}
