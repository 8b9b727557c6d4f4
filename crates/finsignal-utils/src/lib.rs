//! Shared utilities for finsignal
//!
//! Logging setup used by the command-line host and any other binary
//! embedding the engine.

pub mod logging;

pub use logging::{LogConfig, LogFormat, init_tracing};
