//! # Weather Handler
//!
//! Relays current-weather lookups to OpenWeatherMap. The handler validates
//! the request, resolves the configured API key, and maps every upstream
//! outcome to exactly one HTTP response.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::error::{self, ApiError};
use crate::server::AppState;
use crate::upstream::UpstreamOutcome;

/// Proxies a current-weather lookup for the given city
#[utoipa::path(
    get,
    path = "/weather/{city}",
    params(
        ("city" = String, Path, description = "City name, e.g. 'London' or 'New York'")
    ),
    responses(
        (
            status = 200,
            description = "Current weather payload exactly as returned by OpenWeatherMap",
            body = serde_json::Value
        ),
        (status = 400, description = "City name was empty", body = ApiError),
        (status = 401, description = "OpenWeatherMap rejected the configured API key", body = ApiError),
        (status = 404, description = "City not known to OpenWeatherMap", body = ApiError),
        (status = 408, description = "Upstream request timed out", body = ApiError),
        (status = 500, description = "API key missing or unexpected failure", body = ApiError),
        (status = 503, description = "Upstream unreachable", body = ApiError)
    ),
    tag = "weather"
)]
pub async fn get_weather(
    State(state): State<AppState>,
    Path(city): Path<String>,
) -> Result<Response, ApiError> {
    // Key presence is checked before anything else; without one, no request
    // can succeed and the upstream must not be contacted.
    let Some(api_key) = state.config.configured_api_key() else {
        return Err(error::missing_api_key());
    };

    let city = city.trim();
    if city.is_empty() {
        return Err(error::empty_city());
    }

    match state.weather.current_weather(city, api_key).await {
        UpstreamOutcome::Success(body) => Ok(weather_payload(body)),
        UpstreamOutcome::Status { status, body } => {
            if status == StatusCode::NOT_FOUND {
                Err(error::city_not_found())
            } else if status == StatusCode::UNAUTHORIZED {
                Err(error::invalid_api_key())
            } else {
                Err(error::upstream_error(status, body))
            }
        }
        UpstreamOutcome::Timeout => Err(error::upstream_timeout()),
        UpstreamOutcome::ConnectionFailed => Err(error::upstream_unreachable()),
        UpstreamOutcome::Unknown(message) => Err(error::unexpected(&message)),
    }
}

/// Successful payloads are relayed byte-for-byte, never re-encoded.
fn weather_payload(body: Bytes) -> Response {
    (
        StatusCode::OK,
        [(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        )],
        body,
    )
        .into_response()
}
