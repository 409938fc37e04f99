use crate::config::ScoutConfig;
use crate::error::Result;
use crate::observer::{NoopObserver, ScoutEvent, SharedObserver};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::future::Future;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};
use url::Url;

/// Something that can turn a URL into a [`FetchOutcome`]. Failures are carried
/// in the outcome, never returned as errors.
pub trait Fetch: Send + Sync {
    fn fetch(&self, url: &str) -> impl Future<Output = FetchOutcome> + Send;
}

impl<T: Fetch> Fetch for Arc<T> {
    fn fetch(&self, url: &str) -> impl Future<Output = FetchOutcome> + Send {
        (**self).fetch(url)
    }
}

impl<T: Fetch> Fetch for &T {
    fn fetch(&self, url: &str) -> impl Future<Output = FetchOutcome> + Send {
        (**self).fetch(url)
    }
}

#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
    json: OnceLock<std::result::Result<Value, String>>,
}

impl FetchResponse {
    pub fn new(status: u16, body: String) -> Self {
        Self {
            status,
            body,
            json: OnceLock::new(),
        }
    }

    /// Parse the body as JSON. The parse runs once; later calls reuse it.
    pub fn json(&self) -> std::result::Result<&Value, &str> {
        self.json
            .get_or_init(|| serde_json::from_str(&self.body).map_err(|e| e.to_string()))
            .as_ref()
            .map_err(|e| e.as_str())
    }

    /// Take the parsed body, reusing an earlier [`FetchResponse::json`] parse.
    pub fn into_json(self) -> std::result::Result<Value, String> {
        match self.json.into_inner() {
            Some(parsed) => parsed,
            None => serde_json::from_str(&self.body).map_err(|e| e.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub url: String,
    pub response: Option<FetchResponse>,
    pub error: Option<String>,
}

impl FetchOutcome {
    pub fn success(url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            response: Some(FetchResponse::new(status, body.into())),
            error: None,
        }
    }

    pub fn failure(url: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            response: None,
            error: Some(error.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.response.is_some() && self.error.is_none()
    }

    pub fn status(&self) -> Option<u16> {
        self.response.as_ref().map(|r| r.status)
    }

    pub fn body(&self) -> Option<&str> {
        self.response.as_ref().map(|r| r.body.as_str())
    }

    pub fn error_message(&self) -> &str {
        self.error.as_deref().unwrap_or("unknown error")
    }
}

/// reqwest-backed fetcher with retries, backoff, 429 handling, and a per-host
/// politeness limiter.
pub struct HttpFetcher {
    client: Client,
    config: ScoutConfig,
    limiter: Option<Arc<DefaultKeyedRateLimiter<String>>>,
    observer: SharedObserver,
}

impl HttpFetcher {
    pub fn new(config: &ScoutConfig) -> Result<Self> {
        let timeout = config.request_timeout();
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(timeout)
            .connect_timeout(timeout / 2)
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .gzip(true)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        let limiter = Quota::with_period(config.politeness_delay())
            .map(|quota| Arc::new(RateLimiter::keyed(quota)));

        Ok(Self {
            client,
            config: config.clone(),
            limiter,
            observer: Arc::new(NoopObserver),
        })
    }

    pub fn with_observer(mut self, observer: SharedObserver) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &ScoutConfig {
        &self.config
    }

    async fn wait_for_host(&self, url: &str) {
        let Some(limiter) = &self.limiter else {
            return;
        };
        if let Some(host) = host_key(url) {
            limiter.until_key_ready(&host).await;
        }
    }

    async fn backoff(&self, url: &str, attempt: u32, delay: Duration, reason: &str) {
        debug!("Sleeping {:?} before retrying {} ({})", delay, url, reason);
        self.observer.event(&ScoutEvent::FetchBackoff {
            url: url.to_string(),
            attempt,
            delay,
            reason: reason.to_string(),
        });
        sleep(delay).await;
    }
}

impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> FetchOutcome {
        let attempts = self.config.attempts();
        let mut last_error: Option<String> = None;

        for attempt in 1..=attempts {
            if attempt > 1 {
                let delay = self.config.backoff_delay(attempt - 1);
                self.backoff(url, attempt - 1, delay, "retry").await;
            }

            self.wait_for_host(url).await;
            self.observer.event(&ScoutEvent::FetchAttempt {
                url: url.to_string(),
                attempt,
            });
            debug!("Requesting {} (attempt {}/{})", url, attempt, attempts);

            let response = match self.client.get(url).send().await {
                Ok(response) => response,
                Err(e) => {
                    warn!("Attempt {} failed for {}: {}", attempt, url, e);
                    last_error = Some(e.to_string());
                    continue;
                }
            };

            if response.status() == StatusCode::TOO_MANY_REQUESTS {
                warn!("Received 429 from {}, backing off", url);
                last_error = Some(format!("HTTP 429 Too Many Requests for {}", url));
                if attempt < attempts {
                    let delay = self.config.backoff_delay(attempt);
                    self.backoff(url, attempt, delay, "429").await;
                }
                continue;
            }

            // Any 3xx left after redirect handling counts as a failure
            let status = response.status();
            if !status.is_success() {
                warn!("Attempt {} failed for {}: HTTP {}", attempt, url, status);
                last_error = Some(format!("HTTP {} for {}", status, url));
                continue;
            }

            let status = status.as_u16();
            match response.text().await {
                Ok(body) => {
                    sleep(self.config.politeness_delay()).await;
                    self.observer.event(&ScoutEvent::FetchSucceeded {
                        url: url.to_string(),
                        status,
                        attempts: attempt,
                    });
                    return FetchOutcome::success(url, status, body);
                }
                Err(e) => {
                    warn!("Attempt {} failed reading body of {}: {}", attempt, url, e);
                    last_error = Some(e.to_string());
                }
            }
        }

        let error = last_error.unwrap_or_else(|| "unknown error".to_string());
        self.observer.event(&ScoutEvent::FetchFailed {
            url: url.to_string(),
            error: error.clone(),
            attempts,
        });
        FetchOutcome::failure(url, error)
    }
}

fn host_key(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    Some(match parsed.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}
