//! HTTP API: configuration, service wiring, routing and response mapping.

pub mod app;
pub mod config;
