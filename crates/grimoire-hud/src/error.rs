//! Error types for the HUD driver binary.
//!
//! [`DriverError`] wraps every failure mode of startup and the stdio loop
//! so `main` can propagate with `?`.

/// Top-level error for the HUD driver.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// Configuration loading or validation failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: grimoire_core::config::ConfigError,
    },

    /// The `driver` section of the config file is malformed.
    #[error("driver config error: {message}")]
    DriverConfig {
        /// Description of the problem.
        message: String,
    },

    /// The session rejected a request or has stopped.
    #[error("session error: {source}")]
    Session {
        /// The underlying session error.
        #[from]
        source: grimoire_core::session::SessionError,
    },

    /// Reading commands or writing views failed.
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// A view model could not be serialized.
    #[error("serialization error: {source}")]
    Json {
        /// The underlying serde error.
        #[from]
        source: serde_json::Error,
    },

    /// A background task panicked or was cancelled.
    #[error("task failed: {message}")]
    Task {
        /// Description of the failure.
        message: String,
    },

    /// The shared host state lock was poisoned.
    #[error("host state lock poisoned")]
    HostPoisoned,
}
