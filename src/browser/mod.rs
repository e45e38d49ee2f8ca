//! Headless Chromium session driven over the DevTools protocol

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::traits::BrowserSession;

const POLL_INTERVAL: Duration = Duration::from_millis(250);
const WINDOW_SIZE: (u32, u32) = (1920, 1080);

/// Launch options for the browser process
#[derive(Debug, Clone, Copy)]
pub struct BrowserOptions {
    pub headless: bool,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self { headless: true }
    }
}

pub struct ChromiumSession {
    browser: Browser,
    page: Page,
    handler: Option<JoinHandle<()>>,
}

impl ChromiumSession {
    pub async fn launch(options: BrowserOptions) -> Result<Self> {
        info!("Launching Chromium (headless: {})", options.headless);

        let mut builder = BrowserConfig::builder()
            .window_size(WINDOW_SIZE.0, WINDOW_SIZE.1)
            .arg("--disable-gpu");
        if !options.headless {
            builder = builder.with_head();
        }
        let config = builder
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build browser config: {e}"))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("Failed to launch Chromium")?;

        // The handler must be polled for any page command to complete
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("CDP handler event error (continuing): {}", e);
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .context("Failed to open browser page")?;

        info!("Browser session ready");
        Ok(Self {
            browser,
            page,
            handler: Some(handler),
        })
    }
}

/// Stop the CDP handler task, then report the first shutdown error
fn finish_close(
    handler: &mut Option<JoinHandle<()>>,
    closed: Result<()>,
    exited: Result<()>,
) -> Result<()> {
    if let Some(handler) = handler.take() {
        handler.abort();
    }
    closed?;
    exited
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn goto(&self, url: &str) -> Result<()> {
        self.page
            .goto(url)
            .await
            .with_context(|| format!("Failed to load {url}"))?;
        Ok(())
    }

    async fn current_url(&self) -> Result<Option<String>> {
        Ok(self.page.url().await?)
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<bool> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.page.find_elements(selector).await {
                Ok(elements) if !elements.is_empty() => return Ok(true),
                Ok(_) => {}
                Err(e) => debug!("Selector {} not queryable yet: {}", selector, e),
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn content(&self) -> Result<String> {
        Ok(self.page.content().await?)
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let element = self
            .page
            .find_element(selector)
            .await
            .with_context(|| format!("No element matches {selector}"))?;
        element.click().await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        let closed = self
            .browser
            .close()
            .await
            .map(drop)
            .context("Failed to close browser");
        let exited = match &closed {
            Ok(()) => self
                .browser
                .wait()
                .await
                .map(drop)
                .context("Failed waiting for browser to exit"),
            Err(_) => Ok(()),
        };
        finish_close(&mut self.handler, closed, exited)
    }
}
