//! Shared utilities for the wallet engine.

pub mod logging;

pub use logging::{init_logging, try_init_logging, LogFormat, LoggingError};
