//! # Tests for Handlers
//!
//! This module contains unit tests that call the handlers directly, without
//! going through the HTTP stack. Upstream-facing paths are covered by the
//! integration tests; everything here must finish without network access.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::handlers::{health::health_check, root, weather::get_weather};
use crate::models::ServiceInfo;
use crate::server::AppState;
use crate::upstream::WeatherClient;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde_json::Value;

fn state_with(config: AppConfig) -> State<AppState> {
    let config = Arc::new(config);
    let weather = WeatherClient::new(&config).expect("Failed to build test weather client");
    State(AppState { config, weather })
}

#[tokio::test]
async fn test_root_handler_returns_banner() {
    let Json(info) = root().await;

    assert_eq!(info.message, "✅ Weather API is running!");
}

#[tokio::test]
async fn test_root_handler_returns_valid_json() {
    let Json(info) = root().await;

    let json_value: Value =
        serde_json::to_value(&info).expect("Failed to serialize ServiceInfo");

    assert_eq!(
        json_value.get("message").unwrap().as_str().unwrap(),
        "✅ Weather API is running!"
    );
}

#[test]
fn test_service_info_default() {
    let service_info = ServiceInfo::default();

    assert_eq!(service_info.message, "✅ Weather API is running!");
}

#[tokio::test]
async fn test_health_reports_configured_key() {
    let mut config = AppConfig::default();
    config.api_key = Some("test-key".to_string());

    let Json(report) = health_check(state_with(config)).await;

    assert_eq!(report.status, "healthy");
    assert!(report.api_key_configured);
}

#[tokio::test]
async fn test_health_reports_missing_key() {
    let Json(report) = health_check(state_with(AppConfig::default())).await;

    assert_eq!(report.status, "healthy");
    assert!(!report.api_key_configured);
}

#[tokio::test]
async fn test_health_treats_blank_key_as_missing() {
    let mut config = AppConfig::default();
    config.api_key = Some("   ".to_string());

    let Json(report) = health_check(state_with(config)).await;

    assert!(!report.api_key_configured);
}

#[tokio::test]
async fn test_get_weather_without_key_fails_before_validation() {
    // Key presence is checked first, so even an empty city reports the
    // configuration error. No upstream request is attempted.
    let result = get_weather(state_with(AppConfig::default()), Path(String::new())).await;

    let error = result.err().expect("Expected configuration error");
    assert_eq!(error.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error.code, Box::from("CONFIGURATION_ERROR"));
    assert_eq!(error.detail, Value::from("API key not found"));
}

#[tokio::test]
async fn test_get_weather_rejects_empty_city() {
    let mut config = AppConfig::default();
    config.api_key = Some("test-key".to_string());

    let result = get_weather(state_with(config), Path(String::new())).await;

    let error = result.err().expect("Expected validation error");
    assert_eq!(error.status, StatusCode::BAD_REQUEST);
    assert_eq!(error.code, Box::from("VALIDATION_FAILED"));
    assert_eq!(error.detail, Value::from("City name cannot be empty"));
}

#[tokio::test]
async fn test_get_weather_rejects_whitespace_city() {
    let mut config = AppConfig::default();
    config.api_key = Some("test-key".to_string());

    let result = get_weather(state_with(config), Path("   ".to_string())).await;

    let error = result.err().expect("Expected validation error");
    assert_eq!(error.status, StatusCode::BAD_REQUEST);
    assert_eq!(error.detail, Value::from("City name cannot be empty"));
}
