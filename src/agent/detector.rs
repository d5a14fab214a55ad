use anyhow::{Context, Result, anyhow};
use log::{debug, info};
use reqwest::blocking::Client;
use serde_json::{Value, json};
use url::Url;

use crate::agent::IntentDetector;
use crate::config::ResolvedService;
use crate::domain::intent::Intent;

/// Intent detection through Groq's OpenAI-compatible chat completions API.
pub struct GroqIntentDetector {
    http: Client,
    endpoint: Url,
    api_key: String,
    model: String,
    system_prompt: String,
}

impl GroqIntentDetector {
    pub fn new(
        http: Client,
        base_url: &Url,
        api_key: String,
        model: String,
        tools: &[ResolvedService; 3],
    ) -> Result<Self> {
        Ok(Self {
            http,
            endpoint: chat_completions_url(base_url)?,
            api_key,
            model,
            system_prompt: system_prompt(tools),
        })
    }

    fn chat(&self, input: &str) -> Result<String> {
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": self.system_prompt },
                { "role": "user", "content": input },
            ],
            "temperature": 0.0,
        });

        let resp = self
            .http
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .context("groq request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            return Err(anyhow!(
                "groq {}: {}",
                status,
                resp.text().unwrap_or_default()
            ));
        }

        let v: Value = resp.json().context("groq returned invalid json")?;
        let content = v
            .pointer("/choices/0/message/content")
            .and_then(|x| x.as_str())
            .ok_or_else(|| anyhow!("missing choices[0].message.content"))?;
        Ok(content.to_string())
    }
}

impl IntentDetector for GroqIntentDetector {
    fn detect(&self, input: &str) -> Result<Intent> {
        let reply = self.chat(input)?;
        debug!("Intent model replied: {reply:?}");
        let intent = Intent::from_reply(&reply);
        info!("Detected intent: {intent}");
        Ok(intent)
    }
}

fn chat_completions_url(base: &Url) -> Result<Url> {
    // keep any path prefix such as /openai/v1
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base.join("chat/completions")?)
}

fn system_prompt(tools: &[ResolvedService; 3]) -> String {
    let mut prompt = String::from(
        "You are a request router. Classify the user's request into exactly one label.\n\nLABELS:\n",
    );
    for (intent, tool) in Intent::TOOLS.iter().zip(tools.iter()) {
        prompt.push_str(&format!("- {}: {}\n", intent.label(), tool.description));
    }
    prompt.push_str(&format!(
        "- {}: none of the above, or the request is unclear\n\n",
        Intent::Unknown.label()
    ));
    prompt.push_str("Reply with the label only, no punctuation or explanation.");
    prompt
}
