//! Backend construction error types.

use thiserror::Error;

/// Errors raised while assembling the backend constructs.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("no bundle pinned for unit {0}; add a [bundles.{0}] entry")]
    MissingBundle(String),

    #[error(transparent)]
    Compose(#[from] latchkey_compose::ComposeError),

    #[error("core model error: {0}")]
    Core(#[from] latchkey_core::CoreError),
}

pub type BackendResult<T> = Result<T, BackendError>;
