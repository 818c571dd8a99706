//! Bridge between the command-line shell and the Zapple Pay crates.
//! This must remain the only shell-facing boundary for network operations.

use eyre::{eyre, Result, WrapErr};
use tracing::{info, warn};

use zapple_pay_adapters::{
    wallet_nwa_link, ProfileAdapter, SubmissionAdapter, WalletAuthAdapter, WalletAuthSession,
    ZappleConfig,
};
use zapple_pay_core::{
    AuthToken, AuthorizationParams, AuthorizationRequest, Profile, ProfilePort,
    PublicKey, ReactionSubscription, RecurringSubscription, SubmissionPort,
};

pub struct ZappleBridge {
    cfg: ZappleConfig,
    session: WalletAuthSession<WalletAuthAdapter>,
    submissions: SubmissionAdapter,
    profiles: ProfileAdapter,
}

impl ZappleBridge {
    pub fn new(cfg: ZappleConfig) -> Result<Self> {
        let wallet_auth =
            WalletAuthAdapter::with_config(&cfg).wrap_err("failed to build wallet auth client")?;
        let submissions =
            SubmissionAdapter::with_config(&cfg).wrap_err("failed to build submission client")?;
        let profiles =
            ProfileAdapter::with_config(&cfg).wrap_err("failed to build profile client")?;
        Ok(Self {
            session: WalletAuthSession::new(wallet_auth, &cfg),
            cfg,
            submissions,
            profiles,
        })
    }

    /// Starts a wallet authorization and begins polling for approval.
    pub async fn request_wallet(&self, params: AuthorizationParams) -> Result<AuthorizationRequest> {
        let request = self.session.start(params).await?;
        info!(id = %request.id, "waiting for wallet approval");
        Ok(request)
    }

    pub fn wallet_link(&self, request: &AuthorizationRequest) -> Result<String> {
        let link = wallet_nwa_link(&self.cfg, &request.uri)
            .wrap_err("failed to build wallet connection link")?;
        Ok(link.to_string())
    }

    /// Resolves once the wallet approves the pending authorization.
    pub async fn await_approval(&self) -> Result<AuthToken> {
        self.session
            .wait_for_token()
            .await
            .ok_or_else(|| eyre!("wallet authorization was torn down before approval"))
    }

    pub async fn submit_reaction(&self, subscription: &ReactionSubscription) -> Result<()> {
        info!(
            npub = %subscription.npub,
            amount_sats = subscription.amount_sats,
            wallet = subscription.wallet.kind(),
            donations = subscription.donations.len(),
            "saving reaction zaps"
        );
        self.submissions
            .set_user(subscription)
            .await
            .wrap_err("failed to save reaction zaps")
    }

    pub async fn submit_autozap(&self, subscription: &RecurringSubscription) -> Result<()> {
        info!(
            to_npub = %subscription.to_npub,
            amount_sats = subscription.amount_sats,
            time_period = %subscription.time_period,
            wallet = subscription.wallet.kind(),
            "saving autozap"
        );
        self.submissions
            .create_subscription(subscription)
            .await
            .wrap_err("failed to save autozap")
    }

    /// Missing or unreachable profiles are not errors; the shell falls back to the npub.
    pub async fn lookup_profile(&self, pubkey: &PublicKey) -> Option<Profile> {
        match self.profiles.fetch_profile(pubkey).await {
            Ok(profile) => profile,
            Err(e) => {
                warn!(pubkey = %pubkey, "profile lookup failed: {e}");
                None
            }
        }
    }
}
