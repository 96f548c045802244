use crate::model::ShareTarget;
use anyhow::{Context, Result};

const TWEET_INTENT_URL: &str = "https://twitter.com/intent/tweet?text=";
const TRUTH_SHARE_URL: &str = "https://truthsocial.com/share?text=";

/// Share-intent URL with `text` percent-encoded into the query.
pub fn share_url(target: ShareTarget, text: &str) -> String {
    let base = match target {
        ShareTarget::Tweet => TWEET_INTENT_URL,
        ShareTarget::Truth => TRUTH_SHARE_URL,
    };
    format!("{}{}", base, urlencoding::encode(text))
}

/// Opens share URLs somewhere the user can act on them.
pub trait Launcher {
    fn launch(&mut self, url: &str) -> Result<()>;
}

/// Opens URLs in the system's default browser.
#[derive(Debug, Default)]
pub struct BrowserLauncher;

impl Launcher for BrowserLauncher {
    fn launch(&mut self, url: &str) -> Result<()> {
        tracing::info!(url, "opening share url");
        open::that(url).with_context(|| format!("failed to open {url}"))
    }
}

/// Prints URLs instead of opening them, for `--no-open`.
#[derive(Debug, Default)]
pub struct PrintLauncher;

impl Launcher for PrintLauncher {
    fn launch(&mut self, url: &str) -> Result<()> {
        println!("{url}");
        Ok(())
    }
}
