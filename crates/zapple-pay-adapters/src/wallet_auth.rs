use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use zapple_pay_core::{
    AuthorizationParams, AuthorizationRequest, AuthorizationStatus, PortError, WalletAuthPort,
};

use crate::config::ZappleConfig;
use crate::http::{ensure_success, malformed, transport};

#[derive(Debug, Deserialize)]
struct WalletAuthResponse {
    id: String,
    uri: String,
}

/// Zapple Pay's `/wallet-auth` and `/check-wallet-auth` endpoints.
#[derive(Debug, Clone)]
pub struct WalletAuthAdapter {
    client: reqwest::Client,
    create_url: String,
    status_url: String,
}

impl WalletAuthAdapter {
    pub fn with_config(cfg: &ZappleConfig) -> Result<Self, PortError> {
        Ok(Self {
            client: cfg.http_client().map_err(transport)?,
            create_url: cfg.api_url("wallet-auth"),
            status_url: cfg.api_url("check-wallet-auth"),
        })
    }
}

#[async_trait]
impl WalletAuthPort for WalletAuthAdapter {
    async fn create_authorization(
        &self,
        params: &AuthorizationParams,
    ) -> Result<AuthorizationRequest, PortError> {
        let response = self
            .client
            .get(&self.create_url)
            .query(&params.query_pairs())
            .send()
            .await
            .map_err(transport)?;
        let body: WalletAuthResponse = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(malformed)?;
        debug!(id = %body.id, "wallet auth created");
        AuthorizationRequest::new(body.id, body.uri, params).map_err(malformed)
    }

    async fn authorization_status(&self, id: &str) -> Result<AuthorizationStatus, PortError> {
        let response = self
            .client
            .get(&self.status_url)
            .query(&[("id", id)])
            .send()
            .await
            .map_err(transport)?;
        let body: Value = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(malformed)?;
        Ok(AuthorizationStatus::from_json(&body))
    }
}
