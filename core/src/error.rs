use thiserror::Error;

use revmap_common::error::{CollaboratorError, ConfigError, StoreError};

/// Errors that stop a run before the first stage.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to set up HTTP client: {0}")]
    Client(#[from] CollaboratorError),
}
