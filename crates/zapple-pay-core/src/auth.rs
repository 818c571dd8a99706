use nostr::PublicKey;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::domain::{
    AuthorizationParams, AuthorizationRequest, AuthorizationStatus, TimePeriod, ValidationError,
};
use crate::ports::{PortError, WalletAuthPort};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreationError {
    #[error(transparent)]
    InvalidParams(#[from] ValidationError),
    #[error("Failed to get Nostr Wallet Auth details: {0}")]
    Service(#[from] PortError),
    /// The session was torn down or restarted before the service answered.
    #[error("wallet authorization was cancelled before it was created")]
    Cancelled,
}

/// Validates the budget pair, then asks the service for a new authorization.
///
/// An amount without a period (or the reverse) fails before the port is called.
pub async fn create_authorization<W>(
    port: &W,
    amount_sats: Option<u64>,
    time_period: Option<TimePeriod>,
    identity: Option<PublicKey>,
) -> Result<AuthorizationRequest, CreationError>
where
    W: WalletAuthPort + ?Sized,
{
    let params = AuthorizationParams::from_parts(amount_sats, time_period, identity)?;
    request_authorization(port, &params).await
}

pub async fn request_authorization<W>(
    port: &W,
    params: &AuthorizationParams,
) -> Result<AuthorizationRequest, CreationError>
where
    W: WalletAuthPort + ?Sized,
{
    debug!(budget = ?params.budget, identity = ?params.identity, "creating wallet authorization");
    port.create_authorization(params).await.map_err(|e| {
        error!("wallet authorization creation failed: {e}");
        CreationError::Service(e)
    })
}

/// Never fails: any error reads as "not connected" so one bad poll
/// cannot end the session. A declined or expired authorization looks the same.
pub async fn check_authorization<W>(port: &W, id: &str) -> AuthorizationStatus
where
    W: WalletAuthPort + ?Sized,
{
    match port.authorization_status(id).await {
        Ok(status) => {
            debug!(id, connected = status.is_connected(), "wallet authorization status");
            status
        }
        Err(e) => {
            warn!(id, "wallet authorization status check failed: {e}");
            AuthorizationStatus::NotConnected
        }
    }
}
