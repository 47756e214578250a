//! # Host Error Types

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while setting up the host loop.
#[derive(Error, Debug)]
pub enum HostError {
    /// Config file could not be read.
    #[error("cannot read config {}: {source}", path.display())]
    ConfigIo {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Config text is not valid TOML for this schema.
    #[error("invalid config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Tick rate must be at least 1 Hz.
    #[error("invalid tick rate: {0} Hz")]
    InvalidTickRate(u32),
}

/// Result type for host operations.
pub type HostResult<T> = Result<T, HostError>;
