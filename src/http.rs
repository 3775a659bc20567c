use std::fmt::Display;

use reqwest::Response;

///
/// A non-2xx response, with whatever body the server sent back
///
#[derive(Debug)]
pub struct StatusError {
    pub status: u16,
    pub message: String,
}

impl Display for StatusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "server responded with {}: {}", self.status, self.message)
    }
}

impl std::error::Error for StatusError {}

pub async fn check_status(res: Response) -> Result<Response, StatusError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let message = res.text().await.unwrap_or_default();
    Err(StatusError { status: status.as_u16(), message })
}
