pub mod adapters;
pub mod detector;
pub mod router;

use anyhow::Result;

use crate::domain::intent::Intent;

/// Classifies free-form input into one of the known intents.
pub trait IntentDetector: Send + Sync {
    fn detect(&self, input: &str) -> Result<Intent>;
}

/// One downstream service reachable by the router.
pub trait ServiceAdapter: Send + Sync {
    fn name(&self) -> &str;
    fn execute(&self, input: &str) -> Result<String>;
}

pub use adapters::HttpServiceAdapter;
pub use detector::GroqIntentDetector;
pub use router::{FALLBACK_MESSAGE, TaskRouter};
