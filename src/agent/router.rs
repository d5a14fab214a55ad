use anyhow::Result;
use log::{info, warn};

use crate::agent::{GroqIntentDetector, HttpServiceAdapter, IntentDetector, ServiceAdapter};
use crate::config::Config;
use crate::domain::intent::Intent;
use crate::http::build_client;

pub const FALLBACK_MESSAGE: &str = "Could not determine the appropriate action for your request.";

/// Detects the intent of a request and hands it to the matching service.
pub struct TaskRouter {
    detector: Box<dyn IntentDetector>,
    tool1: Box<dyn ServiceAdapter>,
    tool2: Box<dyn ServiceAdapter>,
    tool3: Box<dyn ServiceAdapter>,
}

impl TaskRouter {
    pub fn new(
        detector: Box<dyn IntentDetector>,
        tool1: Box<dyn ServiceAdapter>,
        tool2: Box<dyn ServiceAdapter>,
        tool3: Box<dyn ServiceAdapter>,
    ) -> Self {
        Self {
            detector,
            tool1,
            tool2,
            tool3,
        }
    }

    /// Wires the Groq detector and the three HTTP adapters from config.
    pub fn from_config(cfg: &Config, groq_api_key: String) -> Result<Self> {
        let http = build_client(cfg.request_timeout())?;
        let services = cfg.services()?;
        let detector = GroqIntentDetector::new(
            http.clone(),
            &cfg.groq_base_url()?,
            groq_api_key,
            cfg.groq_model(),
            &services,
        )?;
        let [s1, s2, s3] = services;
        Ok(Self::new(
            Box::new(detector),
            Box::new(HttpServiceAdapter::new("service1", s1.url, http.clone())),
            Box::new(HttpServiceAdapter::new("service2", s2.url, http.clone())),
            Box::new(HttpServiceAdapter::new("service3", s3.url, http)),
        ))
    }

    pub fn execute(&self, input: &str) -> Result<String> {
        let intent = self.detector.detect(input)?;
        let adapter = match intent {
            Intent::Tool1 => &self.tool1,
            Intent::Tool2 => &self.tool2,
            Intent::Tool3 => &self.tool3,
            Intent::Unknown => {
                warn!("No tool matched the request");
                return Ok(FALLBACK_MESSAGE.to_string());
            }
        };
        info!("Routing {} request to {}", intent, adapter.name());
        adapter.execute(input)
    }
}
