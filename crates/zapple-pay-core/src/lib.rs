pub mod auth;
pub mod domain;
pub mod ports;
pub mod session;
pub mod state_machine;

pub use auth::{check_authorization, create_authorization, request_authorization, CreationError};
pub use domain::{
    parse_public_key, AuthToken, AuthorizationParams, AuthorizationRequest, AuthorizationStatus,
    Budget, Donation, NwcUri, Profile, ReactionSubscription, RecurringSubscription, TimePeriod,
    ValidationError, WalletConnection,
};
pub use ports::{PortError, ProfilePort, SubmissionError, SubmissionPort, WalletAuthPort};
pub use session::{AuthorizationSession, PollOrdering, PollOutcome, PollTicket, SessionEvent};
pub use state_machine::{
    session_transition, SessionAction, SessionState, StateTransition, TransitionError,
};

pub use nostr::PublicKey;
