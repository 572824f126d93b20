//! # Data Models
//!
//! This module contains the response models served by the Weather Proxy's
//! own endpoints. Weather payloads themselves are relayed as raw provider
//! bytes and never modeled here.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Banner returned by the root endpoint
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    /// Human-readable liveness banner
    pub message: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            message: "✅ Weather API is running!".to_string(),
        }
    }
}

/// Health report returned by the health endpoint
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthStatus {
    /// Always "healthy" while the process is serving requests
    pub status: String,
    /// Whether an OpenWeatherMap API key is configured
    pub api_key_configured: bool,
}

impl HealthStatus {
    /// Builds a report for the given key state.
    pub fn report(api_key_configured: bool) -> Self {
        Self {
            status: "healthy".to_string(),
            api_key_configured,
        }
    }
}
