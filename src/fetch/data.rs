use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::{Config, USizeOpt};

/// How many times and how patiently a request is retried.
///
/// Delays start at `initial_backoff` and double after each retry, never
/// exceeding `max_backoff` when one is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: usize,
    pub initial_backoff: Duration,
    pub max_backoff: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(1000),
            max_backoff: None,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: usize, initial_backoff: Duration) -> Self {
        Self {
            max_retries,
            initial_backoff,
            max_backoff: None,
        }
    }

    /// Caps every retry delay at `max_backoff`.
    pub fn with_max_backoff(mut self, max_backoff: Duration) -> Self {
        self.max_backoff = Some(max_backoff);
        self
    }

    /// Reads the policy from the configuration; a zero `max_backoff_ms` leaves it uncapped.
    pub async fn from_config(config: &Config) -> Self {
        let max_retries = config.usize(USizeOpt::MaxRetries).await;
        let initial = config.usize(USizeOpt::InitialBackoffMs).await;
        let cap = config.usize(USizeOpt::MaxBackoffMs).await;

        let policy = Self::new(max_retries, Duration::from_millis(initial as u64));
        match cap {
            0 => policy,
            cap => policy.with_max_backoff(Duration::from_millis(cap as u64)),
        }
    }

    /// The delay before the first retry.
    pub fn first_backoff(&self) -> Duration {
        self.capped(self.initial_backoff)
    }

    /// The delay following `current`.
    pub fn next_backoff(&self, current: Duration) -> Duration {
        self.capped(current.saturating_mul(2))
    }

    fn capped(&self, delay: Duration) -> Duration {
        match self.max_backoff {
            Some(cap) => delay.min(cap),
            None => delay,
        }
    }
}

/// Why a fetch did not produce items.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// No response was obtained at all
    #[error("transport failure: {0}")]
    Transport(String),
    /// The service answered `429 Too Many Requests`
    #[error("rate limited by the catalog service")]
    RateLimited,
    /// The service answered with a non-2xx status other than 429
    #[error("unexpected HTTP status {0}")]
    HttpStatus(u16),
    /// A 2xx body that is not the expected JSON envelope
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    /// The request URL could not be built
    #[error("invalid request URL: {0}")]
    InvalidUrl(String),
    /// Every retry was spent; holds the reason of the last attempt
    #[error("retries exhausted, last failure: {0}")]
    RetriesExhausted(Box<FetchError>),
}

impl FetchError {
    /// Whether another attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::RateLimited)
    }
}

/// The result of one logical fetch.
pub type FetchOutcome = Result<Vec<Item>, FetchError>;

/// One catalog record.
///
/// The record is kept as the JSON object the service sent, so fields the
/// accessors do not know about are preserved.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Item(Map<String, Value>);

impl From<Map<String, Value>> for Item {
    fn from(value: Map<String, Value>) -> Self {
        Self(value)
    }
}

impl Item {
    /// Raw access to any field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn id(&self) -> Option<u64> {
        self.0.get("mal_id").and_then(Value::as_u64)
    }

    pub fn title(&self) -> Option<&str> {
        self.str_field("title")
    }

    /// The English title when there is one, the original title otherwise.
    pub fn display_title(&self) -> Option<&str> {
        self.str_field("title_english")
            .filter(|title| !title.is_empty())
            .or_else(|| self.title())
    }

    pub fn image_url(&self) -> Option<&str> {
        self.0
            .get("images")
            .and_then(|images| images.get("webp"))
            .and_then(|webp| webp.get("large_image_url"))
            .and_then(Value::as_str)
    }

    pub fn score(&self) -> Option<f64> {
        self.0.get("score").and_then(Value::as_f64)
    }

    pub fn status(&self) -> Option<&str> {
        self.str_field("status")
    }

    pub fn genres(&self) -> Vec<&str> {
        self.0
            .get("genres")
            .and_then(Value::as_array)
            .map(|genres| {
                genres
                    .iter()
                    .filter_map(|genre| genre.get("name").and_then(Value::as_str))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn synopsis(&self) -> Option<&str> {
        self.str_field("synopsis")
    }

    /// Media type such as `TV`, `Movie` or `Manhwa`.
    pub fn kind(&self) -> Option<&str> {
        self.str_field("type")
    }

    pub fn url(&self) -> Option<&str> {
        self.str_field("url")
    }
}

/// Extracts the records from a response body of the form `{"data": [...]}`.
///
/// A missing or `null` `data` yields no records.
pub fn parse_items(body: &str) -> Result<Vec<Item>, FetchError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|err| FetchError::MalformedResponse(err.to_string()))?;
    let Value::Object(mut root) = value else {
        return Err(FetchError::MalformedResponse(
            "expected a JSON object".to_string(),
        ));
    };

    match root.remove("data") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(data) => serde_json::from_value(data)
            .map_err(|err| FetchError::MalformedResponse(format!("invalid data: {err}"))),
    }
}

/// A scripted outcome served by the mock fetch controller.
#[derive(Debug, Clone)]
pub struct MockOutcome {
    /// How long the mock waits before answering
    pub delay: Duration,
    pub outcome: FetchOutcome,
}

impl MockOutcome {
    pub fn success(items: Vec<Item>) -> Self {
        Self {
            delay: Duration::ZERO,
            outcome: Ok(items),
        }
    }

    pub fn failure(error: FetchError) -> Self {
        Self {
            delay: Duration::ZERO,
            outcome: Err(error),
        }
    }

    /// Delays the outcome by `delay`.
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}
