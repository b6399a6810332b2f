mod browser;
mod fetch;
mod page;
mod vendor;

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::record::ContactRecord;
use crate::retry;

const BROWSER_ATTEMPTS: u32 = 3;
const BROWSER_BACKOFF: Duration = Duration::from_secs(1);

/// URL-branch cascade. Never fails: every strategy error degrades to the
/// next strategy, and total exhaustion still returns a record carrying the
/// original URL as `website`.
///
/// Order: direct fetch (vendor JSON short-circuit, challenge short-circuit)
/// → headless browser with bounded retry → static extraction of whatever
/// HTML the direct fetch produced → bare URL.
pub async fn scrape_url(cfg: &Config, client: Option<&reqwest::Client>, url: &str) -> ContactRecord {
    let mut fetched_html = None;

    if let Some(client) = client {
        match fetch::direct_fetch(client, url).await {
            Ok(html) => {
                // Server-rendered vendor payload: done without a browser.
                if let Some(value) = vendor::find_vendor_json(&html) {
                    info!("vendor JSON found in direct fetch of {}", url);
                    let mut record = vendor::map_vendor_profile(&value);
                    if record.website.is_empty() {
                        record.website = url.to_string();
                    }
                    return record;
                }
                // Challenge interstitial: a browser would burn retries and
                // risk a ban, return the bare URL instead.
                if fetch::is_challenge_page(&html) {
                    warn!("challenge page detected at {}, skipping browser", url);
                    return website_only(url);
                }
                fetched_html = Some(html);
            }
            Err(e) => warn!("direct fetch of {} failed: {}", url, e),
        }
    } else {
        debug!("HTTP client unconfigured, skipping direct fetch");
    }

    if let Some(endpoint) = &cfg.browser {
        let rendered = retry::with_backoff("browser scrape", BROWSER_ATTEMPTS, BROWSER_BACKOFF, || {
            browser::render_page(endpoint, url)
        })
        .await;

        match rendered {
            Ok(html) => return page::extract_from_html(&html, url),
            Err(e) => warn!("all browser attempts for {} failed: {}", url, e),
        }
    } else {
        debug!("browser unconfigured, skipping render strategy");
    }

    // No browser result; mine the direct-fetch HTML statically if we have it.
    if let Some(html) = fetched_html {
        return page::extract_from_html(&html, url);
    }

    website_only(url)
}

fn website_only(url: &str) -> ContactRecord {
    ContactRecord {
        website: url.to_string(),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::PayloadKind;

    #[tokio::test]
    async fn offline_config_returns_website_only() {
        let cfg = Config::default();
        let record = scrape_url(&cfg, None, "https://example.com/card/123").await;
        assert_eq!(record.website, "https://example.com/card/123");
        assert_eq!(record.populated_fields(), 1);
        assert_eq!(crate::record::score_record(&record, PayloadKind::Url), 0.1);
    }
}
