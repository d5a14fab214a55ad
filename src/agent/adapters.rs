use anyhow::{Context, Result, anyhow};
use log::{debug, error, info};
use reqwest::blocking::Client;
use serde_json::json;
use url::Url;

use crate::agent::ServiceAdapter;

/// Forwards the request body verbatim to one downstream service and hands
/// back whatever it answers.
pub struct HttpServiceAdapter {
    name: String,
    url: Url,
    http: Client,
}

impl HttpServiceAdapter {
    pub fn new(name: impl Into<String>, url: Url, http: Client) -> Self {
        Self {
            name: name.into(),
            url,
            http,
        }
    }
}

impl ServiceAdapter for HttpServiceAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, input: &str) -> Result<String> {
        info!("Calling {} at {}", self.name, self.url);
        let resp = self
            .http
            .post(self.url.clone())
            .json(&json!({ "input_data": input }))
            .send()
            .with_context(|| format!("{} request failed", self.name))?;

        let status = resp.status();
        let body = resp
            .text()
            .with_context(|| format!("{} returned an unreadable body", self.name))?;

        if !status.is_success() {
            error!("{} failed: {} - {}", self.name, status, body);
            return Err(anyhow!("{} {}: {}", self.name, status, body));
        }
        debug!("{} answered with {} bytes", self.name, body.len());
        Ok(body)
    }
}
