#![deny(missing_docs)]

//! Core library for the LawEase legal assistant backend.

/// HTTP routing and REST handlers.
pub mod api;
/// Flow orchestration shared by the HTTP server and the CLI.
pub mod assistant;
/// Language-model backend transports and fallback gateway.
pub mod backend;
/// Environment-driven configuration management.
pub mod config;
/// Text extraction for uploaded documents.
pub mod extract;
/// Keyword-based intent signals and chat routing.
pub mod intent;
/// Structured logging and tracing setup.
pub mod logging;
/// Session-keyed document memory.
pub mod memory;
/// Request and backend counters.
pub mod metrics;
/// Prompt templates for each flow.
pub mod prompt;
/// Post-processing of backend output.
pub mod sanitize;
