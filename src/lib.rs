//! # Weather Proxy Library
//!
//! This library provides the core functionality for the Weather Proxy service,
//! including handlers, models, upstream client, and server configuration.

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod server;
pub mod telemetry;
pub mod upstream;
