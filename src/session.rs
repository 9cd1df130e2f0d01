use crate::error::FetchError;
use async_trait::async_trait;
use fantoccini::{Client, ClientBuilder};
use std::time::Duration;
use tokio::time::timeout;

/// Timeouts applied to every page fetch.
#[derive(Debug, Clone, Copy)]
pub struct FetchLimits {
    /// Upper bound for one fetch, navigation and render wait included.
    pub fetch_timeout: Duration,
    /// Upper bound for the document-stability poll after navigation.
    pub render_timeout: Duration,
}

impl Default for FetchLimits {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(45),
            render_timeout: Duration::from_secs(10),
        }
    }
}

/// A page-fetching resource, exclusively owned by one shop run.
///
/// Not safe for concurrent use: extraction within a shop is strictly
/// sequential over one session, and the runner closes the session before
/// its worker slot is reused.
#[async_trait]
pub trait Session: Send {
    /// Fetches a URL and returns the rendered document source.
    async fn fetch(&mut self, url: &str) -> Result<String, FetchError>;

    /// Releases the underlying resource. Called on every exit path.
    async fn close(self: Box<Self>);
}

/// Opens one session per shop run.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn open(&self) -> Result<Box<dyn Session>, FetchError>;
}

/// A WebDriver-backed session. Needed because product detail is often
/// rendered by client-side scripts after document load.
pub struct WebDriverSession {
    client: Client,
    limits: FetchLimits,
}

#[async_trait]
impl Session for WebDriverSession {
    async fn fetch(&mut self, url: &str) -> Result<String, FetchError> {
        let deadline = self.limits.fetch_timeout;
        match timeout(deadline, self.fetch_inner(url)).await {
            Ok(result) => result,
            Err(_) => {
                ::log::error!("timeout fetching: {}", url);
                Err(FetchError::Timeout {
                    url: url.to_string(),
                    seconds: deadline.as_secs(),
                })
            }
        }
    }

    async fn close(self: Box<Self>) {
        if let Err(e) = self.client.close().await {
            ::log::warn!("failed to close WebDriver session: {}", e);
        }
    }
}

impl WebDriverSession {
    async fn fetch_inner(&mut self, url: &str) -> Result<String, FetchError> {
        self.client.goto(url).await?;
        self.wait_until_settled().await;
        Ok(self.client.source().await?)
    }

    /// Bounded render wait: polls `document.readyState` until complete,
    /// then waits for the page source to stop changing between polls.
    /// On deadline the current source is used as-is.
    async fn wait_until_settled(&mut self) {
        let deadline = tokio::time::Instant::now() + self.limits.render_timeout;
        let mut last_len: Option<usize> = None;

        loop {
            if tokio::time::Instant::now() >= deadline {
                ::log::warn!(
                    "render wait hit the {:?} deadline, using current source",
                    self.limits.render_timeout
                );
                return;
            }

            let ready = match self
                .client
                .execute("return document.readyState", vec![])
                .await
            {
                Ok(serde_json::Value::String(state)) => state == "complete",
                _ => false,
            };

            if ready {
                match self.client.source().await {
                    Ok(source) => {
                        let len = source.len();
                        if last_len == Some(len) {
                            return;
                        }
                        last_len = Some(len);
                    }
                    // Source retrieval errors surface on the final read.
                    Err(_) => return,
                }
            }

            tokio::time::sleep(Duration::from_millis(250)).await;
        }
    }
}

/// Connects WebDriver sessions, trying the configured URL first and then
/// a ladder of common local ports.
pub struct WebDriverProvider {
    webdriver_url: String,
    limits: FetchLimits,
}

const FALLBACK_URLS: &[&str] = &[
    "http://localhost:9515", // ChromeDriver default
    "http://localhost:4723", // Appium default
    "http://localhost:9222", // Chrome debug port default
    "http://127.0.0.1:4444", // Try with IP instead of localhost
];

impl WebDriverProvider {
    pub fn new(webdriver_url: impl Into<String>, limits: FetchLimits) -> Self {
        Self {
            webdriver_url: webdriver_url.into(),
            limits,
        }
    }
}

#[async_trait]
impl SessionProvider for WebDriverProvider {
    async fn open(&self) -> Result<Box<dyn Session>, FetchError> {
        match ClientBuilder::native().connect(&self.webdriver_url).await {
            Ok(client) => {
                ::log::debug!("connected to WebDriver at {}", self.webdriver_url);
                return Ok(Box::new(WebDriverSession {
                    client,
                    limits: self.limits,
                }));
            }
            Err(e) => {
                ::log::error!(
                    "failed to connect to WebDriver at {}: {}",
                    self.webdriver_url,
                    e
                );
            }
        }

        for url in FALLBACK_URLS {
            if *url == self.webdriver_url {
                continue;
            }
            ::log::info!("trying fallback WebDriver URL: {}", url);
            if let Ok(client) = ClientBuilder::native().connect(url).await {
                ::log::debug!("connected to fallback WebDriver at {}", url);
                return Ok(Box::new(WebDriverSession {
                    client,
                    limits: self.limits,
                }));
            }
        }

        ::log::error!(
            "no WebDriver server reachable; set WEBDRIVER_URL or start one at {}",
            self.webdriver_url
        );
        Err(FetchError::NoWebDriver(self.webdriver_url.clone()))
    }
}
