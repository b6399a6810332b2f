use anyhow::Result;
use tracing::debug;

/// Lightweight direct GET of the page HTML. The client already carries a
/// browser User-Agent and Accept-Language (see `Config::http_client`); the
/// per-request timeout comes from the client as well.
pub async fn direct_fetch(client: &reqwest::Client, url: &str) -> Result<String> {
    let response = client.get(url).send().await?.error_for_status()?;
    let html = response.text().await?;
    debug!("direct fetch of {} returned {} bytes", url, html.len());
    Ok(html)
}

// Interstitial markers seen on challenge pages. Retrying a headless browser
// against these burns attempts and risks provider bans, so the cascade
// short-circuits instead.
const CHALLENGE_MARKERS: &[&str] = &[
    "just a moment",
    "checking your browser",
    "cf-chl",
    "cf-challenge",
    "attention required",
    "verify you are human",
    "captcha",
];

pub fn is_challenge_page(html: &str) -> bool {
    let lower = html.to_lowercase();
    CHALLENGE_MARKERS.iter().any(|m| lower.contains(m))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_cloudflare_interstitial() {
        let html = "<html><head><title>Just a moment...</title></head><body>\
            <div id=\"cf-challenge-running\"></div></body></html>";
        assert!(is_challenge_page(html));
    }

    #[test]
    fn detects_captcha() {
        assert!(is_challenge_page("<body>Please solve this CAPTCHA</body>"));
    }

    #[test]
    fn normal_page_passes() {
        assert!(!is_challenge_page("<html><body><h1>Jane Smith</h1></body></html>"));
    }
}
