use serde::{Deserialize, Serialize};

pub type EmailId = String;

/// One row of the email list. The list endpoint usually returns only ids;
/// the richer fields show up when the backend has already resolved headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailSummary {
    pub id: EmailId,
    #[serde(default)]
    pub thread_id: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub snippet: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailBody {
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmailDetails {
    pub id: EmailId,
    pub from: Option<String>,
    pub to: Option<String>,
    pub cc: Option<String>,
    pub bcc: Option<String>,
    pub subject: Option<String>,
    pub date: Option<String>,
    pub snippet: Option<String>,
    pub body: EmailBody,
    /// Backend payload exactly as received.
    pub raw: serde_json::Value,
}

pub const MIN_RESULTS: u32 = 1;
pub const MAX_RESULTS: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListFilter {
    pub max_results: u32,
    pub include_spam_trash: bool,
    pub query: String,
    /// Comma-separated label ids, sent as-is.
    pub label_ids: String,
}

impl Default for ListFilter {
    fn default() -> Self {
        Self {
            max_results: 10,
            include_spam_trash: false,
            query: String::new(),
            label_ids: String::new(),
        }
    }
}

impl ListFilter {
    pub fn adjust_max_results(&mut self, delta: i32) {
        let next = (self.max_results as i64 + delta as i64)
            .clamp(MIN_RESULTS as i64, MAX_RESULTS as i64);
        self.max_results = next as u32;
    }

    /// Query parameters for the list endpoint; empty text filters are omitted.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            (
                "maxResults",
                self.max_results.clamp(MIN_RESULTS, MAX_RESULTS).to_string(),
            ),
            ("includeSpamTrash", self.include_spam_trash.to_string()),
        ];
        let query = self.query.trim();
        if !query.is_empty() {
            params.push(("q", query.to_string()));
        }
        let labels = self.label_ids.trim();
        if !labels.is_empty() {
            params.push(("labelIds", labels.to_string()));
        }
        params
    }
}
