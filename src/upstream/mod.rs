//! Upstream OpenWeatherMap client.
//!
//! Wraps the HTTP round trip to the provider and classifies every possible
//! result into an [`UpstreamOutcome`]. The classification is total: the
//! client itself never returns an error, so callers map outcomes to
//! responses with an exhaustive match.

use std::time::{Duration, Instant};

use axum::body::Bytes;
use axum::http::StatusCode;
use metrics::{counter, histogram};
use reqwest::Client;

use crate::config::AppConfig;

/// Ceiling on TCP connect establishment; the configured total deadline still
/// applies on top of it.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Every way a current-weather lookup can end.
#[derive(Debug)]
pub enum UpstreamOutcome {
    /// The provider answered 200; payload bytes are kept untouched.
    Success(Bytes),
    /// The provider answered with a non-200 status; the body is kept for relaying.
    Status { status: StatusCode, body: String },
    /// The request exceeded the configured deadline.
    Timeout,
    /// No connection to the provider could be established.
    ConnectionFailed,
    /// A transport failure that fits none of the above.
    Unknown(String),
}

impl UpstreamOutcome {
    /// Stable label for metrics and logs.
    pub fn label(&self) -> &'static str {
        match self {
            UpstreamOutcome::Success(_) => "success",
            UpstreamOutcome::Status { .. } => "status",
            UpstreamOutcome::Timeout => "timeout",
            UpstreamOutcome::ConnectionFailed => "connection_failed",
            UpstreamOutcome::Unknown(_) => "unknown",
        }
    }
}

/// HTTP client for the OpenWeatherMap current-weather endpoint.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    http: Client,
    base_url: String,
}

impl WeatherClient {
    /// Builds a client honoring the configured base URL and request timeout.
    pub fn new(config: &AppConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(config.upstream_timeout())
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: config.upstream_base_url.clone(),
        })
    }

    /// Fetches current weather for `city` and classifies the result.
    pub async fn current_weather(&self, city: &str, api_key: &str) -> UpstreamOutcome {
        let started = Instant::now();
        let outcome = self.request(city, api_key).await;

        histogram!("weather_upstream_latency_ms").record(started.elapsed().as_millis() as f64);
        counter!("weather_upstream_requests_total", "outcome" => outcome.label()).increment(1);

        match &outcome {
            UpstreamOutcome::Success(body) => {
                tracing::debug!(city, bytes = body.len(), "upstream returned current weather");
            }
            UpstreamOutcome::Status { status, .. } => {
                tracing::warn!(
                    city,
                    status = status.as_u16(),
                    "upstream returned non-200 status"
                );
            }
            UpstreamOutcome::Timeout => {
                tracing::warn!(city, "upstream request timed out");
            }
            UpstreamOutcome::ConnectionFailed => {
                tracing::warn!(city, "could not connect to upstream");
            }
            UpstreamOutcome::Unknown(message) => {
                tracing::error!(city, error = %message, "upstream request failed unclassified");
            }
        }

        outcome
    }

    async fn request(&self, city: &str, api_key: &str) -> UpstreamOutcome {
        let response = self
            .http
            .get(&self.base_url)
            .query(&[("q", city), ("appid", api_key), ("units", "metric")])
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(err) => return classify_transport_error(err),
        };

        let status = response.status();
        if status == StatusCode::OK {
            // Reading the body can still hit the deadline, so those errors go
            // through the same classification.
            match response.bytes().await {
                Ok(body) => UpstreamOutcome::Success(body),
                Err(err) => classify_transport_error(err),
            }
        } else {
            match response.text().await {
                Ok(body) => UpstreamOutcome::Status { status, body },
                Err(err) => classify_transport_error(err),
            }
        }
    }
}

/// A connect timeout reports as both timeout and connect error; timeout takes
/// precedence.
fn classify_transport_error(err: reqwest::Error) -> UpstreamOutcome {
    if err.is_timeout() {
        UpstreamOutcome::Timeout
    } else if err.is_connect() {
        UpstreamOutcome::ConnectionFailed
    } else {
        UpstreamOutcome::Unknown(err.to_string())
    }
}
