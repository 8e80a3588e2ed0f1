//! Error taxonomy for a design session.
//!
//! Nothing here is retried. Every variant is surfaced to the console and
//! ends the run.

use std::path::PathBuf;

use crate::llm::LlmError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing credential, bad settings, or unusable user input.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The model-calling service failed (network, API status, rate limit).
    #[error("external service error: {0}")]
    ExternalService(#[from] LlmError),

    /// Persisting an artifact failed.
    #[error("failed to write {}: {source}", path.display())]
    ArtifactWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Configuration(msg.into())
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Configuration(_) => 2,
            Error::ExternalService(_) | Error::ArtifactWrite { .. } => 1,
        }
    }
}
