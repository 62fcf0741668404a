//! Library entry point for the fact-check backend.
//!
//! Exports all core modules for use in integration tests and by the main binary.

pub mod config;
pub mod detection;
pub mod errors;
pub mod handlers;
pub mod logging;
pub mod middleware;
pub mod models;
pub mod report;
pub mod services;

pub use config::AppConfig;
pub use errors::*;
pub use logging::*;
pub use models::*;
pub use services::*;
