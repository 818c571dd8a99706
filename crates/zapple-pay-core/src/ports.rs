use async_trait::async_trait;
use nostr::PublicKey;
use thiserror::Error;

use crate::domain::{
    AuthorizationParams, AuthorizationRequest, AuthorizationStatus, Profile,
    ReactionSubscription, RecurringSubscription,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed response: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    /// Non-2xx from the backend; carries the response text.
    #[error("{0}")]
    Rejected(String),
    #[error("something went wrong: {0}")]
    Transport(String),
}

/// Remote Nostr Wallet Auth service.
#[async_trait]
pub trait WalletAuthPort: Send + Sync {
    async fn create_authorization(
        &self,
        params: &AuthorizationParams,
    ) -> Result<AuthorizationRequest, PortError>;

    async fn authorization_status(&self, id: &str) -> Result<AuthorizationStatus, PortError>;
}

#[async_trait]
pub trait SubmissionPort: Send + Sync {
    async fn set_user(&self, subscription: &ReactionSubscription) -> Result<(), SubmissionError>;

    async fn create_subscription(
        &self,
        subscription: &RecurringSubscription,
    ) -> Result<(), SubmissionError>;
}

#[async_trait]
pub trait ProfilePort: Send + Sync {
    async fn fetch_profile(&self, pubkey: &PublicKey) -> Result<Option<Profile>, PortError>;
}
