use reqwest::Url;

use zapple_pay_core::PortError;

use crate::config::ZappleConfig;
use crate::http::malformed;

/// Link that opens the configured wallet's connection screen with `nwa_uri`
/// pre-filled.
pub fn wallet_nwa_link(cfg: &ZappleConfig, nwa_uri: &str) -> Result<Url, PortError> {
    Url::parse_with_params(&cfg.wallet_connections_url, &[("nwa", nwa_uri)]).map_err(malformed)
}
