//! Error types for the Tally binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during startup and shutdown.

/// Top-level error for the Tally binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: tally_core::config::ConfigError,
    },

    /// The chart server failed to start or crashed.
    #[error("server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: tally_server::ServerError,
    },

    /// The chart driver task panicked or was cancelled.
    #[error("driver error: {message}")]
    Driver {
        /// Description of the driver failure.
        message: String,
    },
}
