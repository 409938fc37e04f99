use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/119.0 Safari/537.36";

/// Which of the two sitemap rule sets to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationMode {
    /// Follow only product-looking index entries, keep only `/products/` pages,
    /// and require a `products` path segment when deriving JSON endpoints.
    #[default]
    Strict,
    /// Follow every index entry, treat every urlset location as a product page,
    /// and derive endpoints by suffixing the path.
    Lenient,
}

impl FromStr for ClassificationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(ClassificationMode::Strict),
            "lenient" => Ok(ClassificationMode::Lenient),
            other => Err(format!("Unknown classification mode '{}'", other)),
        }
    }
}

impl fmt::Display for ClassificationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassificationMode::Strict => write!(f, "strict"),
            ClassificationMode::Lenient => write!(f, "lenient"),
        }
    }
}

/// Settings that control polite crawling behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoutConfig {
    pub max_retries: u32,
    pub request_timeout_secs: u64,
    pub retry_backoff: f64,
    pub delay_between_requests: f64,
    pub user_agent: String,
    pub product_json_extension: String,
    pub max_products: Option<usize>,
    pub mode: ClassificationMode,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            request_timeout_secs: 30,
            retry_backoff: 2.0,
            delay_between_requests: 1.0,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            product_json_extension: ".json".to_string(),
            max_products: None,
            mode: ClassificationMode::Strict,
        }
    }
}

impl ScoutConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.request_timeout_secs = timeout_secs;
        self
    }

    pub fn with_retry_backoff(mut self, backoff: f64) -> Self {
        self.retry_backoff = backoff;
        self
    }

    pub fn with_delay(mut self, delay_secs: f64) -> Self {
        self.delay_between_requests = delay_secs;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.product_json_extension = extension.into();
        self
    }

    pub fn with_max_products(mut self, max_products: Option<usize>) -> Self {
        self.max_products = max_products;
        self
    }

    pub fn with_mode(mut self, mode: ClassificationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Number of attempts per URL. Always at least one.
    pub fn attempts(&self) -> u32 {
        self.max_retries.max(1)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn politeness_delay(&self) -> Duration {
        seconds(self.delay_between_requests)
    }

    /// `retry_backoff ^ attempt` seconds.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        seconds(self.retry_backoff.powi(exponent))
    }
}

fn seconds(value: f64) -> Duration {
    if value.is_finite() && value > 0.0 {
        Duration::try_from_secs_f64(value).unwrap_or(Duration::MAX)
    } else {
        Duration::ZERO
    }
}
