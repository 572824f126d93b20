//! # Server Configuration
//!
//! This module contains the server setup and configuration for the Weather
//! Proxy: shared application state, router assembly, and the serve loop.

use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    http::{HeaderValue, Method},
    middleware,
    routing::get,
};
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AppConfig;
use crate::handlers;
use crate::telemetry;
use crate::upstream::WeatherClient;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub weather: WeatherClient,
}

/// Creates and configures the Axum application router
pub fn create_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/", get(handlers::root))
        .route("/weather/{city}", get(handlers::weather::get_weather))
        .route("/health", get(handlers::health::health_check))
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .layer(middleware::from_fn(telemetry::trace_context_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Builds the CORS layer from the configured origin whitelist. Credentialed
/// requests are allowed, so origins and headers are always echoed explicitly
/// rather than wildcarded.
fn cors_layer(config: &AppConfig) -> CorsLayer {
    // Origins were validated at config load; unparseable entries cannot occur.
    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Starts the server with the given configuration
pub async fn run_server(config: AppConfig) -> anyhow::Result<()> {
    // Resolve the configured bind address
    let addr = config
        .bind_addr()
        .with_context(|| format!("invalid server address '{}'", config.api_bind_addr))?;

    let weather =
        WeatherClient::new(&config).context("failed to build upstream HTTP client")?;
    let state = AppState {
        config: Arc::new(config),
        weather,
    };
    let app = create_app(state.clone());

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!(%addr, profile = %state.config.profile, "weather proxy listening");

    axum::serve(listener, app).await?;

    Ok(())
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::weather::get_weather,
        crate::handlers::health::health_check,
    ),
    components(
        schemas(
            crate::models::ServiceInfo,
            crate::models::HealthStatus,
            crate::error::ApiError,
        )
    ),
    info(
        title = "Weather Proxy API",
        description = "Thin proxy over the OpenWeatherMap current weather API",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;
