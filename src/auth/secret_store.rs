use anyhow::{Result, anyhow};
use keyring::{Entry, Error as KeyringError};

const SERVICE: &str = "foundrmate";
const GROQ_ACCOUNT: &str = "groq_api_key";
pub const GROQ_API_KEY_ENV: &str = "GROQ_API_KEY";

/// Save the Groq API key into the OS keyring
pub fn save_groq_api_key(api_key: &str) -> Result<()> {
    let entry = Entry::new(SERVICE, GROQ_ACCOUNT);
    entry?
        .set_password(api_key)
        .map_err(|e| anyhow!(e.to_string()))?;
    Ok(())
}

/// Load the Groq API key from the keyring, if one was stored
pub fn load_groq_api_key() -> Result<Option<String>> {
    let entry = Entry::new(SERVICE, GROQ_ACCOUNT);
    match entry?.get_password() {
        Ok(v) => Ok(Some(v)),
        Err(KeyringError::NoEntry) => Ok(None),
        Err(e) => Err(anyhow!(e.to_string())),
    }
}

/// `GROQ_API_KEY` from the environment, else the keyring.
pub fn resolve_groq_api_key() -> Result<String> {
    pick_api_key(std::env::var(GROQ_API_KEY_ENV).ok(), load_groq_api_key)
}

fn pick_api_key(
    from_env: Option<String>,
    from_keyring: impl FnOnce() -> Result<Option<String>>,
) -> Result<String> {
    if let Some(key) = from_env.filter(|k| !k.trim().is_empty()) {
        return Ok(key);
    }
    from_keyring()?.ok_or_else(|| {
        anyhow!("{GROQ_API_KEY_ENV} not set; export it or run `foundrmate set-api-key`")
    })
}
