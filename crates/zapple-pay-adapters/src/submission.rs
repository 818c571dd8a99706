use async_trait::async_trait;
use serde::Serialize;
use tracing::{error, info};

use zapple_pay_core::{
    PortError, ReactionSubscription, RecurringSubscription, SubmissionError, SubmissionPort,
};

use crate::config::ZappleConfig;
use crate::http::transport;

const GENERIC_FAILURE: &str = "something went wrong";

/// Zapple Pay's `/set-user` and `/create-subscription` endpoints.
#[derive(Debug, Clone)]
pub struct SubmissionAdapter {
    client: reqwest::Client,
    set_user_url: String,
    create_subscription_url: String,
}

impl SubmissionAdapter {
    pub fn with_config(cfg: &ZappleConfig) -> Result<Self, PortError> {
        Ok(Self {
            client: cfg.http_client().map_err(transport)?,
            set_user_url: cfg.api_url("set-user"),
            create_subscription_url: cfg.api_url("create-subscription"),
        })
    }

    async fn post<T: Serialize + ?Sized>(&self, url: &str, body: &T) -> Result<(), SubmissionError> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!(url, "submission failed: {e}");
                SubmissionError::Transport(e.to_string())
            })?;

        let status = response.status();
        if status.is_success() {
            info!(url, %status, "submission accepted");
            return Ok(());
        }

        let text = response.text().await.unwrap_or_default();
        error!(url, %status, body = %text, "submission rejected");
        if text.trim().is_empty() {
            Err(SubmissionError::Rejected(GENERIC_FAILURE.to_owned()))
        } else {
            Err(SubmissionError::Rejected(text))
        }
    }
}

#[async_trait]
impl SubmissionPort for SubmissionAdapter {
    async fn set_user(&self, subscription: &ReactionSubscription) -> Result<(), SubmissionError> {
        self.post(&self.set_user_url, subscription).await
    }

    async fn create_subscription(
        &self,
        subscription: &RecurringSubscription,
    ) -> Result<(), SubmissionError> {
        self.post(&self.create_subscription_url, subscription).await
    }
}
