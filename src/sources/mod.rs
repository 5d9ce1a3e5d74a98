pub mod github;
pub mod log_source;

use crate::error::Result;
use reqwest::Client;
use std::time::Duration;

/// Shared HTTP client for both pollers
pub fn http_client(timeout: Duration) -> Result<Client> {
    let client = Client::builder()
        .timeout(timeout)
        .user_agent(format!("epochwatch/{}", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}
