use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use tracing::debug;

use crate::config::BrowserEndpoint;

const NAV_TIMEOUT: Duration = Duration::from_secs(30);
// Client-rendered card pages populate the DOM after network idle; give them
// a fixed settle window before capturing content.
const SETTLE_DELAY: Duration = Duration::from_secs(3);

/// Render `url` in a fresh headless browser and return the final page HTML.
///
/// Each call owns its browser instance: acquired here, closed on every exit
/// path including navigation errors and timeouts. Instances are never pooled
/// or shared across invocations.
pub async fn render_page(endpoint: &BrowserEndpoint, url: &str) -> Result<String> {
    let (mut browser, mut handler) = match endpoint {
        BrowserEndpoint::Launch { chrome_bin } => {
            let mut builder = BrowserConfig::builder();
            if let Some(bin) = chrome_bin {
                builder = builder.chrome_executable(bin);
            }
            let config = builder
                .build()
                .map_err(|e| anyhow!("browser config failed: {}", e))?;
            Browser::launch(config)
                .await
                .context("failed to launch browser")?
        }
        BrowserEndpoint::Connect { ws_url } => Browser::connect(ws_url)
            .await
            .context("failed to connect to remote browser")?,
    };

    // CDP events must be drained for the connection to make progress.
    let event_loop = tokio::spawn(async move { while handler.next().await.is_some() {} });

    // One deadline covers the whole attempt: navigation, the settle window
    // and the content read. A hung CDP call cannot stall past it.
    let html = with_deadline(url, async {
        let page = browser.new_page(url).await?;
        page.wait_for_navigation().await?;
        tokio::time::sleep(SETTLE_DELAY).await;
        page.content().await.context("failed to read page content")
    })
    .await;

    let _ = browser.close().await;
    let _ = browser.wait().await;
    event_loop.abort();

    debug!("browser render of {} {}", url, if html.is_ok() { "succeeded" } else { "failed" });
    html
}

async fn with_deadline<T>(
    url: &str,
    attempt: impl std::future::Future<Output = Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(NAV_TIMEOUT, attempt).await {
        Ok(res) => res,
        Err(_) => Err(anyhow!("page render of {} timed out", url)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn deadline_bounds_the_whole_attempt() {
        let slow = async {
            tokio::time::sleep(NAV_TIMEOUT + SETTLE_DELAY).await;
            Ok(String::new())
        };
        let err = with_deadline("https://example.com", slow).await.unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_passes_fast_results_through() {
        let fast = async {
            tokio::time::sleep(SETTLE_DELAY).await;
            Ok("html".to_string())
        };
        assert_eq!(with_deadline("https://example.com", fast).await.unwrap(), "html");
    }
}
