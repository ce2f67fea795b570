/*
[INPUT]:  Failure sources (signing agent, statement fields, relying party, transport)
[OUTPUT]: Typed handshake errors with user-facing messages and recovery hints
[POS]:    Error handling layer - unified error type for the whole crate
[UPDATE]: When adding new failure kinds or changing recovery guidance
*/

use thiserror::Error;

use crate::handshake::HandshakeState;

/// Main error type for the sign-in handshake
///
/// Every variant is terminal for the attempt that produced it. A new attempt
/// needs a freshly issued nonce, so nothing here is retried automatically.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandshakeError {
    /// No signing agent is reachable
    #[error("Signing agent unavailable: {0}")]
    AgentUnavailable(String),

    /// The agent is reachable but exposes no authorized account
    #[error("Signing agent reported no authorized accounts")]
    NoAuthorizedAccounts,

    /// The user refused the account authorization prompt
    #[error("Account authorization declined by user")]
    UserDeclined,

    /// The user refused to sign the statement
    #[error("Signature request rejected by user")]
    UserRejected,

    /// A statement field cannot be rendered safely
    #[error("Invalid field `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// The signature is not attributable to the resolved account
    #[error("Signing address mismatch: expected {expected}, got {actual}")]
    AddressMismatch { expected: String, actual: String },

    /// Transport-level failure talking to the relying party
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The relying party refused the signed statement
    #[error("Sign-in rejected by relying party (status {status}): {reason}")]
    SignInRejected { status: u16, reason: String },

    /// Malformed payload from the agent or relying party
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Client configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Attempted transition that the linear handshake does not allow
    #[error("Invalid handshake transition: {from} -> {to}")]
    InvalidState {
        from: HandshakeState,
        to: HandshakeState,
    },
}

/// Discriminant of [`HandshakeError`], carried by `HandshakeState::Failed`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    AgentUnavailable,
    NoAuthorizedAccounts,
    UserDeclined,
    UserRejected,
    InvalidField,
    AddressMismatch,
    NetworkError,
    SignInRejected,
    InvalidResponse,
    Config,
    InvalidState,
}

/// What the caller should do after a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Start a fresh attempt (new nonce)
    Retry,
    /// Ask the user to connect, unlock or switch wallet accounts first
    Reauthorize,
    /// Not recoverable by the user
    Abort,
}

impl HandshakeError {
    /// Shorthand for [`HandshakeError::InvalidField`]
    pub fn invalid_field(field: &'static str, reason: impl Into<String>) -> Self {
        HandshakeError::InvalidField {
            field,
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            HandshakeError::AgentUnavailable(_) => FailureKind::AgentUnavailable,
            HandshakeError::NoAuthorizedAccounts => FailureKind::NoAuthorizedAccounts,
            HandshakeError::UserDeclined => FailureKind::UserDeclined,
            HandshakeError::UserRejected => FailureKind::UserRejected,
            HandshakeError::InvalidField { .. } => FailureKind::InvalidField,
            HandshakeError::AddressMismatch { .. } => FailureKind::AddressMismatch,
            HandshakeError::NetworkError(_) => FailureKind::NetworkError,
            HandshakeError::SignInRejected { .. } => FailureKind::SignInRejected,
            HandshakeError::InvalidResponse(_) => FailureKind::InvalidResponse,
            HandshakeError::Config(_) => FailureKind::Config,
            HandshakeError::InvalidState { .. } => FailureKind::InvalidState,
        }
    }

    /// Short actionable message suitable for showing to the user
    pub fn user_message(&self) -> &'static str {
        self.kind().user_message()
    }

    pub fn recovery(&self) -> Recovery {
        self.kind().recovery()
    }

    /// Check if a fresh attempt may succeed without user intervention
    pub fn is_retryable(&self) -> bool {
        self.recovery() == Recovery::Retry
    }
}

impl FailureKind {
    pub fn user_message(self) -> &'static str {
        match self {
            FailureKind::AgentUnavailable => "No wallet found. Install or enable a wallet extension.",
            FailureKind::NoAuthorizedAccounts => "Please connect your wallet first.",
            FailureKind::UserDeclined => "Wallet connection declined.",
            FailureKind::UserRejected => "Signing declined.",
            FailureKind::InvalidField => "The sign-in request could not be prepared.",
            FailureKind::AddressMismatch => {
                "The wallet signed with a different account. Switch to the connected account and try again."
            }
            FailureKind::NetworkError => "Could not reach the server. Check your connection and try again.",
            FailureKind::SignInRejected => "Sign-in rejected by server.",
            FailureKind::InvalidResponse => "Received an unexpected response. Please try again.",
            FailureKind::Config => "Sign-in is misconfigured.",
            FailureKind::InvalidState => "A sign-in attempt is already in progress.",
        }
    }

    pub fn recovery(self) -> Recovery {
        match self {
            FailureKind::NetworkError
            | FailureKind::SignInRejected
            | FailureKind::InvalidResponse => Recovery::Retry,
            FailureKind::AgentUnavailable
            | FailureKind::NoAuthorizedAccounts
            | FailureKind::UserDeclined
            | FailureKind::UserRejected
            | FailureKind::AddressMismatch => Recovery::Reauthorize,
            FailureKind::InvalidField | FailureKind::Config | FailureKind::InvalidState => {
                Recovery::Abort
            }
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

impl From<reqwest::Error> for HandshakeError {
    fn from(err: reqwest::Error) -> Self {
        HandshakeError::NetworkError(err.to_string())
    }
}

impl From<serde_json::Error> for HandshakeError {
    fn from(err: serde_json::Error) -> Self {
        HandshakeError::InvalidResponse(err.to_string())
    }
}

impl From<url::ParseError> for HandshakeError {
    fn from(err: url::ParseError) -> Self {
        HandshakeError::Config(format!("invalid URL: {err}"))
    }
}

/// Result type alias for handshake operations
pub type Result<T> = std::result::Result<T, HandshakeError>;
