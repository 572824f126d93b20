//! # Error Handling
//!
//! This module provides unified error handling for the Weather Proxy,
//! implementing a consistent JSON error response format with trace ID
//! propagation. Every failure a handler can produce has a constructor here,
//! so status codes and messages stay in one place.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::telemetry;

/// Unified API error response structure
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApiError {
    /// HTTP status code for the response
    #[serde(skip_serializing, skip_deserializing)]
    pub status: StatusCode,
    /// Error code for programmatic handling
    pub code: Box<str>,
    /// Error detail: a fixed message, or the upstream body relayed verbatim
    pub detail: serde_json::Value,
    /// Correlation trace ID for debugging (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<Box<str>>,
}

impl ApiError {
    /// Create a new API error with the given status code, code, and detail
    pub fn new<S, D>(status: StatusCode, code: S, detail: D) -> Self
    where
        S: Into<String>,
        D: Into<serde_json::Value>,
    {
        Self {
            status,
            code: code.into().into_boxed_str(),
            detail: detail.into(),
            trace_id: Self::current_trace_id(),
        }
    }

    /// Extract current trace ID from the active request scope (falls back to
    /// a generated correlation ID)
    fn current_trace_id() -> Option<Box<str>> {
        telemetry::current_trace_id()
            .map(|trace_id| trace_id.into_boxed_str())
            .or_else(|| {
                // Fallback: generate a correlation ID for basic client-server log correlation
                Some(format!("corr-{}", &uuid::Uuid::new_v4().to_string()[..8]).into_boxed_str())
            })
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, axum::Json(self)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        // Log the full chain for debugging; the client only sees the message.
        tracing::error!("Internal error: {:?}", error);
        unexpected(&error.to_string())
    }
}

// Constructors for every failure the weather endpoints can produce

/// The server has no OpenWeatherMap API key configured (500)
pub fn missing_api_key() -> ApiError {
    ApiError::new(
        StatusCode::INTERNAL_SERVER_ERROR,
        "CONFIGURATION_ERROR",
        "API key not found",
    )
}

/// The requested city name was empty after trimming (400)
pub fn empty_city() -> ApiError {
    ApiError::new(
        StatusCode::BAD_REQUEST,
        "VALIDATION_FAILED",
        "City name cannot be empty",
    )
}

/// The upstream provider does not know the requested city (404)
pub fn city_not_found() -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, "CITY_NOT_FOUND", "City not found")
}

/// The upstream provider rejected our API key (401)
pub fn invalid_api_key() -> ApiError {
    ApiError::new(
        StatusCode::UNAUTHORIZED,
        "UPSTREAM_AUTH_FAILED",
        "Invalid API key",
    )
}

/// The upstream provider answered with an unexpected status; the status and
/// body are relayed to the caller. JSON bodies are passed through as
/// structured detail, anything else as a raw string.
pub fn upstream_error(status: StatusCode, body: String) -> ApiError {
    let detail = serde_json::from_str::<serde_json::Value>(&body)
        .unwrap_or_else(|_| serde_json::Value::String(body));
    ApiError::new(status, "UPSTREAM_ERROR", detail)
}

/// The upstream request did not complete within the configured timeout (408)
pub fn upstream_timeout() -> ApiError {
    ApiError::new(
        StatusCode::REQUEST_TIMEOUT,
        "UPSTREAM_TIMEOUT",
        "Request timeout",
    )
}

/// A connection to the upstream provider could not be established (503)
pub fn upstream_unreachable() -> ApiError {
    ApiError::new(
        StatusCode::SERVICE_UNAVAILABLE,
        "UPSTREAM_UNREACHABLE",
        "Unable to connect to weather service",
    )
}

/// Catch-all for failures outside the classified outcomes (500)
pub fn unexpected(message: &str) -> ApiError {
    tracing::error!("Unexpected error: {}", message);
    ApiError::new(
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_SERVER_ERROR",
        format!("An error occurred: {}", message),
    )
}
