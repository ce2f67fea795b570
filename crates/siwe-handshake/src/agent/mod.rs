/*
[INPUT]:  External signing agent (wallet) handle
[OUTPUT]: Resolved accounts, personal-message signatures, bound sign-in requests
[POS]:    Agent layer - everything that talks to the key holder
[UPDATE]: When adding agent implementations or changing the signing scheme
*/

pub mod local;
pub mod mock;
pub mod resolver;
pub mod signing;
pub mod traits;

pub use local::LocalKeyAgent;
pub use mock::MockSigningAgent;
pub use resolver::{AccountResolver, initialize};
pub use signing::{
    SignedAuthRequest, SigningAgentClient, decode_personal_message, encode_personal_message,
    format_signature, parse_signature, personal_message_hash, recover_signer,
};
pub use traits::{AgentError, SigningAgent};
