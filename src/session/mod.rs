//! Viewer session: authentication status, the fetched list, the selection and
//! a per-session cache of email details. Every action takes the backend it
//! needs as a parameter, so the whole flow runs without a terminal attached.

use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::fmt;
use url::Url;

use crate::auth::BrowserLauncher;
use crate::domain::email::{EmailDetails, EmailId, EmailSummary, ListFilter};
use crate::mail::EmailApi;
use crate::mail::email_api::TokenRejection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthStatus {
    #[default]
    NotAuthenticated,
    Authenticating,
    Authenticated,
}

impl fmt::Display for AuthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AuthStatus::NotAuthenticated => "not_authenticated",
            AuthStatus::Authenticating => "authenticating",
            AuthStatus::Authenticated => "authenticated",
        })
    }
}

/// Inline feedback for the last user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Success(String),
    Warning(String),
    Error(String),
}

impl Notice {
    pub fn text(&self) -> &str {
        match self {
            Notice::Info(s) | Notice::Success(s) | Notice::Warning(s) | Notice::Error(s) => s,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Error(_))
    }
}

pub const DETAILS_UNAVAILABLE: &str = "Failed to fetch email details. Please try again.";

#[derive(Default)]
pub struct SessionState {
    access_token: Option<String>,
    pub emails: Vec<EmailSummary>,
    pub selected: Option<EmailId>,
    pub status: AuthStatus,
    details: HashMap<EmailId, EmailDetails>,
}

// Hand-written so the token never ends up in logs.
impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionState")
            .field("has_token", &self.access_token.is_some())
            .field("emails", &self.emails.len())
            .field("selected", &self.selected)
            .field("status", &self.status)
            .field("cached_details", &self.details.len())
            .finish()
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn cached_details(&self, id: &str) -> Option<&EmailDetails> {
        self.details.get(id)
    }

    pub fn cache_len(&self) -> usize {
        self.details.len()
    }

    pub fn selected_details(&self) -> Option<&EmailDetails> {
        self.selected.as_deref().and_then(|id| self.details.get(id))
    }

    /// Sends the user to the sign-in page and waits for a pasted token.
    pub fn connect(&mut self, auth_url: &Url, browser: &dyn BrowserLauncher) -> Option<Notice> {
        if self.status != AuthStatus::NotAuthenticated {
            return None;
        }
        info!("User clicked Connect with Google");
        debug!("Opening auth URL: {auth_url}");
        let notice = match browser.open(auth_url) {
            Ok(()) => Notice::Info(
                "After authenticating, please paste your access token below.".to_string(),
            ),
            Err(_) => Notice::Warning(format!(
                "Could not open a browser. Visit {auth_url} and paste the access token below."
            )),
        };
        self.status = AuthStatus::Authenticating;
        info!("Set auth_status to {}", self.status);
        Some(notice)
    }

    /// Accepts the token only if the backend answers the probe with 200.
    pub fn submit_token(&mut self, token: &str, api: &dyn EmailApi) -> Notice {
        if self.status != AuthStatus::Authenticating {
            return Notice::Warning("Connect first, then paste your access token.".to_string());
        }
        let token = token.trim();
        if token.is_empty() {
            warn!("Empty access token submitted");
            return Notice::Error("Please enter a valid access token".to_string());
        }

        info!("Access token submitted, validating...");
        match api.verify_token(token) {
            Ok(()) => {
                info!("Token validation successful");
                self.access_token = Some(token.to_string());
                self.status = AuthStatus::Authenticated;
                Notice::Success("Successfully authenticated with Google".to_string())
            }
            Err(TokenRejection::Status(status)) => {
                let msg = format!("Token validation failed: {}", status.as_u16());
                error!("{msg}");
                Notice::Error(msg)
            }
            Err(TokenRejection::Connection(e)) => {
                let msg = format!("Connection error during token validation: {e}");
                error!("{msg}");
                Notice::Error(msg)
            }
        }
    }

    pub fn fetch_emails(&mut self, filter: &ListFilter, api: &dyn EmailApi) -> Notice {
        let Some(token) = self.authenticated_token() else {
            return Notice::Warning("Please authenticate to access your emails".to_string());
        };
        info!("Fetching emails initiated");
        match api.list_emails(&token, filter) {
            Ok(emails) if emails.is_empty() => {
                warn!("No emails found matching criteria");
                self.emails.clear();
                Notice::Warning("No emails found matching your criteria".to_string())
            }
            Ok(emails) => {
                info!("Successfully fetched {} emails", emails.len());
                let n = emails.len();
                self.emails = emails;
                Notice::Success(format!("Found {n} emails"))
            }
            Err(e) => {
                let msg = format!("Error fetching emails: {e:#}");
                error!("{msg}");
                Notice::Error(msg)
            }
        }
    }

    pub fn select_email(&mut self, id: &str) {
        info!("User selected email ID: {id}");
        self.selected = Some(id.to_string());
    }

    pub fn back_to_list(&mut self) {
        if self.selected.take().is_some() {
            info!("User navigated back to email list from details view");
        }
    }

    /// Makes sure the selected email's details are cached. Hits the network
    /// at most once per id per session; a failure leaves nothing cached.
    pub fn load_selected_details(&mut self, api: &dyn EmailApi) -> Option<Notice> {
        let id = self.selected.clone()?;
        if self.details.contains_key(&id) {
            info!("Using cached details for email ID: {id}");
            return None;
        }
        let token = self.authenticated_token()?;
        match api.get_email(&token, &id) {
            Ok(details) => {
                self.details.insert(id, details);
                None
            }
            Err(e) => {
                error!("Error fetching email details: {e:#}");
                Some(Notice::Error(DETAILS_UNAVAILABLE.to_string()))
            }
        }
    }

    pub fn logout(&mut self) {
        info!("User initiated logout");
        *self = Self::default();
        info!("Session state cleared after logout");
    }

    fn authenticated_token(&self) -> Option<String> {
        match self.status {
            AuthStatus::Authenticated => self.access_token.clone(),
            _ => None,
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use anyhow::{Result, anyhow};
    use reqwest::StatusCode;
    use std::cell::{Cell, RefCell};

    /// Scripted backend that counts calls.
    #[derive(Default)]
    pub struct FakeEmailApi {
        pub accepted_token: Option<String>,
        pub unreachable: bool,
        pub emails: Vec<EmailSummary>,
        pub list_fails: bool,
        pub details: HashMap<EmailId, EmailDetails>,
        pub verify_calls: Cell<usize>,
        pub list_calls: RefCell<Vec<(String, ListFilter)>>,
        pub get_calls: RefCell<Vec<EmailId>>,
    }

    impl EmailApi for FakeEmailApi {
        fn verify_token(&self, token: &str) -> std::result::Result<(), TokenRejection> {
            self.verify_calls.set(self.verify_calls.get() + 1);
            if self.unreachable {
                return Err(TokenRejection::Connection(anyhow!("connection refused")));
            }
            match &self.accepted_token {
                Some(t) if t == token => Ok(()),
                _ => Err(TokenRejection::Status(StatusCode::UNAUTHORIZED)),
            }
        }

        fn list_emails(&self, token: &str, filter: &ListFilter) -> Result<Vec<EmailSummary>> {
            self.list_calls
                .borrow_mut()
                .push((token.to_string(), filter.clone()));
            if self.list_fails {
                return Err(anyhow!("500 - backend exploded"));
            }
            Ok(self.emails.clone())
        }

        fn get_email(&self, _token: &str, id: &EmailId) -> Result<EmailDetails> {
            self.get_calls.borrow_mut().push(id.clone());
            self.details
                .get(id)
                .cloned()
                .ok_or_else(|| anyhow!("404 - Email not found"))
        }
    }

    pub struct FakeBrowser {
        pub works: bool,
        pub opened: RefCell<Vec<String>>,
    }

    impl FakeBrowser {
        pub fn new(works: bool) -> Self {
            Self {
                works,
                opened: RefCell::new(Vec::new()),
            }
        }
    }

    impl BrowserLauncher for FakeBrowser {
        fn open(&self, url: &Url) -> Result<()> {
            self.opened.borrow_mut().push(url.to_string());
            if self.works {
                Ok(())
            } else {
                Err(anyhow!("no display"))
            }
        }
    }

    pub fn summary(id: &str) -> EmailSummary {
        EmailSummary {
            id: id.to_string(),
            thread_id: Some(format!("thread-{id}")),
            subject: None,
            from: None,
            snippet: None,
        }
    }

    pub fn details(id: &str, subject: &str) -> EmailDetails {
        EmailDetails {
            id: id.to_string(),
            from: Some("alice@example.com".into()),
            to: Some("me@example.com".into()),
            cc: None,
            bcc: None,
            subject: Some(subject.to_string()),
            date: Some("Tue, 3 Jun 2025 09:00:00 +0000".into()),
            snippet: None,
            body: Default::default(),
            raw: serde_json::json!({ "subject": subject }),
        }
    }

    pub fn auth_url() -> Url {
        Url::parse("http://localhost:4000/auth/google").unwrap()
    }
}
