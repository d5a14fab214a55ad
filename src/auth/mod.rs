pub mod secret_store;

use anyhow::{Result, anyhow};
use log::warn;
use url::Url;

/// Opens URLs for the user. The system browser in production.
pub trait BrowserLauncher {
    fn open(&self, url: &Url) -> Result<()>;
}

pub struct SystemBrowser;

impl BrowserLauncher for SystemBrowser {
    fn open(&self, url: &Url) -> Result<()> {
        open::that(url.as_str()).map_err(|e| {
            warn!("could not open browser automatically: {e}");
            anyhow!(e)
        })
    }
}

/// The auth backend's Google sign-in page.
pub fn google_auth_url(auth_base: &Url) -> Result<Url> {
    let mut url = auth_base.clone();
    url.path_segments_mut()
        .map_err(|_| anyhow!("auth base url cannot be a base: {auth_base}"))?
        .pop_if_empty()
        .extend(["auth", "google"]);
    Ok(url)
}
