use analysis_core::AnalysisError;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

const MAX_ATTEMPTS: u32 = 3;

/// Sliding-window rate limiter: at most `max_requests` per `window` duration.
#[derive(Clone)]
pub struct RateLimiter {
    timestamps: Arc<Mutex<VecDeque<Instant>>>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            timestamps: Arc::new(Mutex::new(VecDeque::new())),
            max_requests: max_requests.max(1),
            window,
        }
    }

    pub fn per_minute(max_requests: usize) -> Self {
        Self::new(max_requests, Duration::from_secs(60))
    }

    pub async fn acquire(&self) {
        loop {
            let mut ts = self.timestamps.lock().await;
            let now = Instant::now();

            while let Some(&front) = ts.front() {
                if now.duration_since(front) >= self.window {
                    ts.pop_front();
                } else {
                    break;
                }
            }

            if ts.len() < self.max_requests {
                ts.push_back(now);
                return;
            }

            // Wait until the oldest request falls out of the window
            let oldest = match ts.front() {
                Some(&oldest) => oldest,
                None => continue,
            };
            let sleep_dur = (oldest + self.window).saturating_duration_since(now)
                + Duration::from_millis(50);
            drop(ts);
            tracing::debug!("Rate limiter: waiting {:.1}s for a request slot", sleep_dur.as_secs_f64());
            tokio::time::sleep(sleep_dur).await;
        }
    }

    /// Requests currently counted against the window.
    pub async fn in_flight(&self) -> usize {
        let ts = self.timestamps.lock().await;
        let now = Instant::now();
        ts.iter().filter(|&&t| now.duration_since(t) < self.window).count()
    }
}

/// HTTP client shared by one upstream: rate limiting plus 429 retry.
#[derive(Clone)]
pub struct ApiTransport {
    label: &'static str,
    client: Client,
    rate_limiter: RateLimiter,
    retry_wait: Duration,
}

impl ApiTransport {
    pub fn new(label: &'static str, client: Client, rate_limiter: RateLimiter) -> Self {
        Self {
            label,
            client,
            rate_limiter,
            retry_wait: Duration::from_secs(15),
        }
    }

    pub fn with_retry_wait(mut self, wait: Duration) -> Self {
        self.retry_wait = wait;
        self
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Send a request with rate limiting and automatic 429 retry.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, AnalysisError> {
        let request = builder.build().map_err(|e| AnalysisError::ApiError(e.to_string()))?;

        for attempt in 0..MAX_ATTEMPTS {
            self.rate_limiter.acquire().await;
            let req_clone = request
                .try_clone()
                .ok_or_else(|| AnalysisError::ApiError("Cannot clone request".to_string()))?;
            let response = self
                .client
                .execute(req_clone)
                .await
                .map_err(|e| AnalysisError::ApiError(format!("{} request failed: {}", self.label, e)))?;

            if response.status() != StatusCode::TOO_MANY_REQUESTS {
                return Ok(response);
            }

            tracing::warn!(
                "{} 429 rate limited, waiting {}s before retry {}/{}",
                self.label,
                self.retry_wait.as_secs(),
                attempt + 1,
                MAX_ATTEMPTS
            );
            tokio::time::sleep(self.retry_wait).await;
        }

        Err(AnalysisError::ApiError(format!(
            "Rate limited by {} after {} retries",
            self.label, MAX_ATTEMPTS
        )))
    }

    /// Send and decode a JSON body, mapping HTTP failures onto `AnalysisError`.
    pub async fn get_json(&self, builder: RequestBuilder) -> Result<serde_json::Value, AnalysisError> {
        let response = self.send(builder).await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(AnalysisError::NotFound(format!("{} returned 404", self.label)));
        }
        if !status.is_success() {
            return Err(AnalysisError::ApiError(format!(
                "{} HTTP {}: {}",
                self.label,
                status,
                response.text().await.unwrap_or_default()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AnalysisError::InvalidData(format!("{} response: {}", self.label, e)))
    }
}

pub(crate) fn build_http_client(timeout: Duration, user_agent: Option<&str>) -> Client {
    let mut builder = Client::builder().timeout(timeout).cookie_store(true);
    if let Some(ua) = user_agent {
        builder = builder.user_agent(ua);
    }
    builder.build().unwrap_or_else(|_| Client::new())
}
