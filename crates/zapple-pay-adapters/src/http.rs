use reqwest::Response;

use zapple_pay_core::PortError;

pub(crate) fn transport(err: reqwest::Error) -> PortError {
    PortError::Transport(err.to_string())
}

pub(crate) fn malformed(err: impl std::fmt::Display) -> PortError {
    PortError::Malformed(err.to_string())
}

/// Passes 2xx responses through; anything else becomes `PortError::Status`.
pub(crate) async fn ensure_success(response: Response) -> Result<Response, PortError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(PortError::Status {
        status: status.as_u16(),
        body,
    })
}
