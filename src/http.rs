use anyhow::Result;
use reqwest::blocking::Client;
use std::time::Duration;

/// Blocking client shared by every outbound call: one fixed timeout, no retries.
pub fn build_client(timeout: Duration) -> Result<Client> {
    Ok(Client::builder()
        .timeout(timeout)
        .user_agent(concat!("foundrmate/", env!("CARGO_PKG_VERSION")))
        .build()?)
}
