use crate::error::SourceError;
use reqwest::{Client, Method, Request, RequestBuilder, Response, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

/// Statuses treated as transient server failures
pub const DEFAULT_RETRY_STATUSES: [u16; 4] = [500, 502, 503, 504];

/// Methods a server must tolerate receiving more than once
pub const DEFAULT_RETRY_METHODS: [Method; 6] = [
    Method::GET,
    Method::HEAD,
    Method::PUT,
    Method::DELETE,
    Method::OPTIONS,
    Method::TRACE,
];

/// Bounded retry with exponential backoff.
///
/// The delay before retry `n` (1-based) is `backoff_factor * 2^(n-1)` seconds,
/// capped at `max_backoff`. No jitter.
///
/// Requests outside `retry_methods` (POST, PATCH) may already have taken
/// effect when a gateway error or read timeout comes back, so they are only
/// retried when the connection could not be established at all.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,
    pub backoff_factor: f64,
    pub max_backoff: Duration,
    pub retry_statuses: Vec<u16>,
    pub retry_methods: Vec<Method>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff_factor: 1.5,
            max_backoff: Duration::from_secs(120),
            retry_statuses: DEFAULT_RETRY_STATUSES.to_vec(),
            retry_methods: DEFAULT_RETRY_METHODS.to_vec(),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff_factor: f64) -> Self {
        Self {
            max_attempts,
            backoff_factor,
            ..Self::default()
        }
    }

    pub fn is_retryable_status(&self, status: StatusCode) -> bool {
        self.retry_statuses.contains(&status.as_u16())
    }

    pub fn is_retryable_method(&self, method: &Method) -> bool {
        self.retry_methods.contains(method)
    }

    pub fn backoff_delay(&self, retry: u32) -> Duration {
        if self.backoff_factor <= 0.0 || !self.backoff_factor.is_finite() {
            return Duration::ZERO;
        }
        let exponent = retry.saturating_sub(1).min(30) as i32;
        let seconds = self.backoff_factor * 2f64.powi(exponent);
        Duration::try_from_secs_f64(seconds)
            .unwrap_or(self.max_backoff)
            .min(self.max_backoff)
    }
}

/// Process-wide HTTP client. Built once, shared read-only by every source.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    policy: RetryPolicy,
}

impl HttpClient {
    pub fn new(
        policy: RetryPolicy,
        connect_timeout: Duration,
        timeout: Duration,
    ) -> Result<Self, SourceError> {
        let client = Client::builder()
            .user_agent(concat!("trakt-archiver/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(connect_timeout)
            .timeout(timeout)
            .build()?;
        Ok(Self { client, policy })
    }

    pub fn from_client(client: Client, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn get(&self, url: &str) -> RequestBuilder {
        self.client.get(url)
    }

    pub fn post(&self, url: &str) -> RequestBuilder {
        self.client.post(url)
    }

    /// Send a request, retrying transient failures according to the policy.
    ///
    /// Non-retryable statuses come back as-is; interpreting them is the
    /// caller's job. When attempts run out on a transient status the last
    /// response is returned. Requests whose body cannot be cloned are sent once.
    pub async fn send(&self, request: RequestBuilder) -> Result<Response, reqwest::Error> {
        let request = request.build()?;
        let repeatable = self.policy.is_retryable_method(request.method());
        self.execute(request, repeatable).await
    }

    /// Like [`send`](Self::send), but retries every transient failure
    /// whatever the method. Only for requests whose effect is the same when
    /// applied twice, such as removing entries from a list.
    pub async fn send_repeatable(&self, request: RequestBuilder) -> Result<Response, reqwest::Error> {
        self.execute(request.build()?, true).await
    }

    async fn execute(&self, request: Request, repeatable: bool) -> Result<Response, reqwest::Error> {
        let max_attempts = self.policy.max_attempts.max(1);
        let method = request.method().clone();
        let mut pending = request;
        let mut attempt = 1u32;

        loop {
            let retry = if attempt < max_attempts {
                pending.try_clone()
            } else {
                None
            };

            let result = self.client.execute(pending).await;

            let next = match retry {
                Some(next) => next,
                None => return result,
            };

            match &result {
                Ok(response) if repeatable && self.policy.is_retryable_status(response.status()) => {
                    warn!(
                        operation = "http_retry",
                        method = %method,
                        url = %response.url(),
                        status = response.status().as_u16(),
                        attempt,
                        max_attempts,
                        "Transient server error, retrying"
                    );
                }
                // A refused connection never delivered the request; a timeout may have
                Err(error) if error.is_connect() || (repeatable && error.is_timeout()) => {
                    warn!(
                        operation = "http_retry",
                        method = %method,
                        url = error.url().map(|u| u.as_str()).unwrap_or("<unknown>"),
                        error = %error,
                        attempt,
                        max_attempts,
                        "Transient transport error, retrying"
                    );
                }
                _ => return result,
            }

            let delay = self.policy.backoff_delay(attempt);
            debug!("Backing off for {:?} before attempt {}", delay, attempt + 1);
            tokio::time::sleep(delay).await;

            pending = next;
            attempt += 1;
        }
    }
}
