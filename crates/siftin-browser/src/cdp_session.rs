use crate::{Error, Result};
use chromiumoxide::browser::Browser;
use chromiumoxide::page::Page;
use futures::StreamExt;
use siftin_core::PageSnapshot;
use std::time::Duration;

pub const DEFAULT_DEBUGGING_PORT: u16 = 9222;
pub const LINKEDIN_FEED_URL: &str = "https://www.linkedin.com/feed/";

const CONNECT_ATTEMPTS: u32 = 5;
const RENDER_SETTLE: Duration = Duration::from_millis(2000);

/// Attaches to a running browser over CDP to read the LinkedIn tab
pub struct CdpSession {
    debugging_port: u16,
}

impl CdpSession {
    pub fn new(debugging_port: u16) -> Self {
        Self { debugging_port }
    }

    pub fn debugging_port(&self) -> u16 {
        self.debugging_port
    }

    pub fn endpoint(&self) -> String {
        format!("http://localhost:{}", self.debugging_port)
    }

    /// Capture URL, title and serialized DOM of the first LinkedIn tab.
    ///
    /// Opens the LinkedIn feed in a new tab when none is open.
    pub async fn snapshot_linkedin(&self) -> Result<PageSnapshot> {
        let endpoint = self.endpoint();
        tracing::info!("CDP session: connecting to browser at {}", endpoint);

        // The browser may still be starting up
        let (browser, mut handler) = {
            let mut retries = CONNECT_ATTEMPTS;
            loop {
                match Browser::connect(&endpoint).await {
                    Ok(result) => {
                        tracing::debug!("CDP connection established");
                        break result;
                    }
                    Err(e) => {
                        retries -= 1;
                        if retries == 0 {
                            return Err(Error::Connect {
                                endpoint,
                                attempts: CONNECT_ATTEMPTS,
                                message: e.to_string(),
                            });
                        }
                        tracing::debug!(
                            "CDP connection attempt failed, retrying... ({} left)",
                            retries
                        );
                        tokio::time::sleep(Duration::from_millis(500)).await;
                    }
                }
            }
        };

        // Commands only complete while the handler is being polled
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("CDP handler event error (continuing): {}", e);
                }
            }
        });

        let result = Self::capture(&browser).await;
        handler_task.abort();
        result
    }

    async fn capture(browser: &Browser) -> Result<PageSnapshot> {
        let page = match Self::find_linkedin_page(browser).await? {
            Some(page) => {
                tracing::debug!("CDP: using existing LinkedIn tab");
                page
            }
            None => {
                tracing::info!("CDP: no LinkedIn tab open, opening {}", LINKEDIN_FEED_URL);
                let page = browser.new_page(LINKEDIN_FEED_URL).await?;
                page.wait_for_navigation().await?;
                tokio::time::sleep(RENDER_SETTLE).await;
                page
            }
        };

        let url = page.url().await?;
        let title = page.get_title().await?;
        let html = page.content().await?;
        if html.trim().is_empty() {
            return Err(Error::EmptyPage);
        }

        tracing::info!(
            "CDP: captured {} bytes from {}",
            html.len(),
            url.as_deref().unwrap_or("unknown page")
        );

        Ok(PageSnapshot { url, title, html })
    }

    async fn find_linkedin_page(browser: &Browser) -> Result<Option<Page>> {
        for page in browser.pages().await? {
            if let Some(url) = page.url().await? {
                if is_linkedin_url(&url) {
                    return Ok(Some(page));
                }
            }
        }
        Ok(None)
    }
}

/// True for http(s) URLs on linkedin.com or a subdomain of it
pub fn is_linkedin_url(raw: &str) -> bool {
    let Ok(parsed) = url::Url::parse(raw) else {
        return false;
    };

    if !matches!(parsed.scheme(), "http" | "https") {
        return false;
    }

    parsed
        .host_str()
        .is_some_and(|host| host == "linkedin.com" || host.ends_with(".linkedin.com"))
}
