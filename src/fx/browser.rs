// src/fx/browser.rs
//
// The headless-browser capability the FX loop scrapes through. The
// loop only needs three things: open a symbol page, read element text
// by CSS selector, and tear the session down. Everything else (vendor,
// wire protocol, rendering) hides behind these traits, which keeps the
// extraction pipeline testable without a live browser.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

/// Session factory. One session is opened per batch, not per symbol.
#[async_trait]
pub trait QuoteBrowser: Send + Sync {
    async fn start_session(&self) -> Result<Box<dyn QuoteSession>>;
}

/// One live browser session. `close` must be called on every exit
/// path; the FX loop guarantees this.
#[async_trait]
pub trait QuoteSession: Send + Sync {
    async fn open_symbol(&mut self, symbol: &str) -> Result<()>;
    /// Text content of the first element matching `selector`, or
    /// `None` when no such element exists on the current page.
    async fn text_of(&self, selector: &str) -> Option<String>;
    async fn close(self: Box<Self>) -> Result<()>;
}

const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

// W3C element identifier key in find-element responses.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Thin W3C WebDriver client over `reqwest`, pointed at a chromedriver
/// (or compatible) endpoint. Only the handful of commands the scraper
/// needs: new session, navigate, find element, element text, delete
/// session.
pub struct WebDriverBrowser {
    endpoint: String,
    symbol_url_template: String,
    client: reqwest::Client,
}

impl WebDriverBrowser {
    pub fn new(endpoint: &str, symbol_url_template: &str, http_timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(http_timeout)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            symbol_url_template: symbol_url_template.to_string(),
            client,
        }
    }
}

#[async_trait]
impl QuoteBrowser for WebDriverBrowser {
    async fn start_session(&self) -> Result<Box<dyn QuoteSession>> {
        let caps = json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": {
                        "args": [
                            "--headless=new",
                            "--no-sandbox",
                            "--disable-dev-shm-usage",
                            "--disable-gpu",
                        ]
                    }
                }
            }
        });

        let resp: Value = self
            .client
            .post(format!("{}/session", self.endpoint))
            .json(&caps)
            .send()
            .await
            .context("webdriver new session request")?
            .json()
            .await
            .context("webdriver new session body")?;

        let session_id = resp["value"]["sessionId"]
            .as_str()
            .ok_or_else(|| anyhow!("webdriver response missing sessionId"))?
            .to_string();

        tracing::debug!(target: "fx", %session_id, "webdriver session started");

        Ok(Box::new(WebDriverSession {
            endpoint: self.endpoint.clone(),
            symbol_url_template: self.symbol_url_template.clone(),
            session_id,
            client: self.client.clone(),
        }))
    }
}

pub struct WebDriverSession {
    endpoint: String,
    symbol_url_template: String,
    session_id: String,
    client: reqwest::Client,
}

impl WebDriverSession {
    fn session_url(&self, tail: &str) -> String {
        format!("{}/session/{}{}", self.endpoint, self.session_id, tail)
    }

    async fn find_element_id(&self, selector: &str) -> Option<String> {
        let body = json!({ "using": "css selector", "value": selector });
        let resp: Value = self
            .client
            .post(self.session_url("/element"))
            .json(&body)
            .send()
            .await
            .ok()?
            .json()
            .await
            .ok()?;
        resp["value"][ELEMENT_KEY].as_str().map(str::to_string)
    }
}

#[async_trait]
impl QuoteSession for WebDriverSession {
    async fn open_symbol(&mut self, symbol: &str) -> Result<()> {
        let url = self.symbol_url_template.replace("{symbol}", symbol);
        let body = json!({ "url": url });
        let resp = self
            .client
            .post(self.session_url("/url"))
            .json(&body)
            .send()
            .await
            .with_context(|| format!("navigating to symbol page for {symbol}"))?;
        if !resp.status().is_success() {
            return Err(anyhow!("navigation returned status {}", resp.status()));
        }
        // Give the page's price widgets a moment to render.
        tokio::time::sleep(Duration::from_secs(2)).await;
        Ok(())
    }

    async fn text_of(&self, selector: &str) -> Option<String> {
        let id = self.find_element_id(selector).await?;
        let resp: Value = self
            .client
            .get(self.session_url(&format!("/element/{id}/text")))
            .send()
            .await
            .ok()?
            .json()
            .await
            .ok()?;
        resp["value"].as_str().map(str::to_string)
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.client
            .delete(self.session_url(""))
            .send()
            .await
            .context("webdriver delete session")?;
        tracing::debug!(target: "fx", session_id = %self.session_id, "webdriver session closed");
        Ok(())
    }
}
