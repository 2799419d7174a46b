use anyhow::{Context as _, Result};
use url::Url;

/// Hands a link to something that can show it.
pub trait UrlOpener: Send {
    fn open(&self, url: &Url) -> Result<()>;
}

/// The desktop's default browser.
pub struct SystemOpener;

impl UrlOpener for SystemOpener {
    fn open(&self, url: &Url) -> Result<()> {
        // Detached with null stdio so launcher output stays off the alternate screen.
        open::that_detached(url.as_str()).with_context(|| format!("launching browser for {url}"))
    }
}
