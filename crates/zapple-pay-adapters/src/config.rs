use std::time::Duration;

use zapple_pay_core::PollOrdering;

#[derive(Debug, Clone)]
pub struct ZappleConfig {
    pub api_base_url: String,
    pub profile_api_url: String,
    pub wallet_connections_url: String,
    pub poll_interval_ms: u64,
    /// `None` leaves individual requests without a deadline.
    pub request_timeout_ms: Option<u64>,
    pub poll_ordering: PollOrdering,
}

impl Default for ZappleConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.zapplepay.com".to_owned(),
            profile_api_url: "https://primal-cache.mutinywallet.com/api".to_owned(),
            wallet_connections_url: "https://app.mutinywallet.com/settings/connections".to_owned(),
            poll_interval_ms: 3_000,
            request_timeout_ms: None,
            poll_ordering: PollOrdering::Latest,
        }
    }
}

impl ZappleConfig {
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Joins `path` onto the API base, tolerating a trailing slash on the base.
    pub fn api_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub(crate) fn http_client(&self) -> Result<reqwest::Client, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(ms) = self.request_timeout_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }
        builder.build()
    }
}
