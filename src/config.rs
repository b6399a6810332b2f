use std::env;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};

/// Realistic desktop UA for the direct-fetch strategy; headless defaults trip
/// bot detection on most card-hosting vendors.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
(KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

const DEFAULT_PRIMARY_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_PRIMARY_MODEL: &str = "gpt-4o-mini";
const DEFAULT_SECONDARY_URL: &str = "https://api.deepseek.com/chat/completions";
const DEFAULT_SECONDARY_MODEL: &str = "deepseek-chat";

/// One remote chat-completions endpoint (OpenAI-compatible shape).
#[derive(Debug, Clone)]
pub struct AiProvider {
    pub name: String,
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
}

/// Direct-fetch settings for the URL branch.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub user_agent: String,
    pub accept_language: String,
    pub timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfig {
            user_agent: USER_AGENT.to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
            timeout: Duration::from_secs(15),
        }
    }
}

/// Where the headless browser comes from: a locally launched Chromium or a
/// remote CDP websocket.
#[derive(Debug, Clone)]
pub enum BrowserEndpoint {
    Launch { chrome_bin: Option<PathBuf> },
    Connect { ws_url: String },
}

/// Runtime configuration. Every external collaborator is optional; an absent
/// one makes the pipeline skip the corresponding strategy rather than fail.
///
/// `Config::default()` is fully offline, which is what the test suite runs
/// against. `Config::from_env()` is what the CLI uses.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub http: Option<HttpConfig>,
    pub browser: Option<BrowserEndpoint>,
    pub ai_primary: Option<AiProvider>,
    pub ai_secondary: Option<AiProvider>,
}

impl Config {
    pub fn from_env() -> Self {
        let http = match env::var("QR_HTTP").as_deref() {
            Ok("off") | Ok("0") => None,
            _ => Some(HttpConfig::default()),
        };

        let browser = if let Ok(ws) = env::var("BROWSER_WS_URL") {
            Some(BrowserEndpoint::Connect { ws_url: ws })
        } else if let Ok(bin) = env::var("CHROME_BIN") {
            Some(BrowserEndpoint::Launch {
                chrome_bin: Some(PathBuf::from(bin)),
            })
        } else if matches!(env::var("QR_BROWSER").as_deref(), Ok("1") | Ok("auto")) {
            Some(BrowserEndpoint::Launch { chrome_bin: None })
        } else {
            None
        };

        let ai_primary = env::var("AI_PRIMARY_API_KEY").ok().map(|key| AiProvider {
            name: "primary".into(),
            endpoint: env::var("AI_PRIMARY_URL").unwrap_or_else(|_| DEFAULT_PRIMARY_URL.into()),
            api_key: key,
            model: env::var("AI_PRIMARY_MODEL").unwrap_or_else(|_| DEFAULT_PRIMARY_MODEL.into()),
        });

        let ai_secondary = env::var("AI_SECONDARY_API_KEY").ok().map(|key| AiProvider {
            name: "secondary".into(),
            endpoint: env::var("AI_SECONDARY_URL")
                .unwrap_or_else(|_| DEFAULT_SECONDARY_URL.into()),
            api_key: key,
            model: env::var("AI_SECONDARY_MODEL")
                .unwrap_or_else(|_| DEFAULT_SECONDARY_MODEL.into()),
        });

        Config {
            http,
            browser,
            ai_primary,
            ai_secondary,
        }
    }

    /// Ordered failover list: primary first, then secondary.
    pub fn ai_providers(&self) -> Vec<&AiProvider> {
        self.ai_primary
            .iter()
            .chain(self.ai_secondary.iter())
            .collect()
    }

    /// Build the shared HTTP client, or `None` when HTTP is unconfigured.
    pub fn http_client(&self) -> Option<reqwest::Client> {
        let http = self.http.as_ref()?;
        let mut headers = HeaderMap::new();
        if let Ok(v) = HeaderValue::from_str(&http.accept_language) {
            headers.insert(ACCEPT_LANGUAGE, v);
        }
        reqwest::Client::builder()
            .user_agent(http.user_agent.clone())
            .default_headers(headers)
            .timeout(http.timeout)
            .build()
            .ok()
    }
}
