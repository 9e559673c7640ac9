#![deny(missing_docs)]

//! Core library for the semantic core proxy.

/// Environment-driven configuration management.
pub mod config;
/// Structured logging and tracing setup.
pub mod logging;
/// Result combinators and panic-to-`Result` helpers.
pub mod result;
/// Semantic core client, service seams, and REST adapter.
pub mod semantic_core;
