use anyhow::{Context, Result, anyhow};
use log::{debug, info};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde_json::{Value, json};
use url::Url;

use crate::domain::email::{EmailDetails, EmailId, EmailSummary, ListFilter};
use crate::mail::decoders::{decode_email_details, decode_list_response};

/// Why a token check did not pass.
#[derive(Debug)]
pub enum TokenRejection {
    /// The backend answered, but not with 200.
    Status(StatusCode),
    /// The backend could not be reached.
    Connection(anyhow::Error),
}

/// The email backend as seen by the viewer session.
pub trait EmailApi {
    /// Probes the list endpoint with `maxResults=1`; only HTTP 200 counts.
    fn verify_token(&self, token: &str) -> std::result::Result<(), TokenRejection>;
    fn list_emails(&self, token: &str, filter: &ListFilter) -> Result<Vec<EmailSummary>>;
    fn get_email(&self, token: &str, id: &EmailId) -> Result<EmailDetails>;
}

pub struct HttpEmailApi {
    base: Url,
    http: Client,
}

impl HttpEmailApi {
    pub fn new(base: Url, http: Client) -> Self {
        Self { base, http }
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("email base url cannot be a base: {}", self.base))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn list_url(&self) -> Result<Url> {
        self.endpoint(&["email", "list-with-token"])
    }
}

impl EmailApi for HttpEmailApi {
    fn verify_token(&self, token: &str) -> std::result::Result<(), TokenRejection> {
        let url = self.list_url().map_err(TokenRejection::Connection)?;
        debug!("Making test request to {url}");
        let resp = self
            .http
            .post(url)
            .query(&[("maxResults", "1")])
            .json(&json!({ "accessToken": token }))
            .send()
            .map_err(|e| TokenRejection::Connection(e.into()))?;

        match resp.status() {
            StatusCode::OK => Ok(()),
            other => Err(TokenRejection::Status(other)),
        }
    }

    fn list_emails(&self, token: &str, filter: &ListFilter) -> Result<Vec<EmailSummary>> {
        let url = self.list_url()?;
        let params = filter.query_params();
        debug!("Making request to {url} with params: {params:?}");
        let resp = self
            .http
            .post(url)
            .query(&params)
            .json(&json!({ "accessToken": token }))
            .send()
            .context("list request failed")?;

        let status = resp.status();
        if status != StatusCode::OK {
            let text = resp.text().unwrap_or_default();
            return Err(anyhow!("{} - {}", status.as_u16(), text));
        }
        let data: Value = resp.json().context("list response is not JSON")?;
        let emails = decode_list_response(data);
        info!("Backend returned {} emails", emails.len());
        Ok(emails)
    }

    fn get_email(&self, token: &str, id: &EmailId) -> Result<EmailDetails> {
        let url = self.endpoint(&["email", "get-email", id.as_str()])?;
        info!("Fetching details for email ID: {id}");
        let resp = self
            .http
            .get(url)
            .bearer_auth(token)
            .send()
            .context("get-email request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().unwrap_or_default();
            return Err(anyhow!(
                "Failed to fetch email details: {} - {}",
                status.as_u16(),
                text
            ));
        }
        let data: Value = resp.json().context("email response is not JSON")?;
        decode_email_details(id, data)
    }
}
