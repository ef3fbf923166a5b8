//! Composition error types.

use thiserror::Error;

/// Errors that abort a composition pass.
#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("duplicate resource id: {0}")]
    DuplicateResource(String),

    #[error("second {kind} declared as {id}; exactly one instance is allowed")]
    DuplicateSingleton { kind: &'static str, id: String },

    #[error("route collision: {path} already registered for {existing_target}")]
    RouteCollision { path: String, existing_target: String },

    #[error("duplicate output name: {0}")]
    DuplicateOutput(String),

    #[error("missing collaborator reference: {0}")]
    MissingReference(String),

    #[error("core model error: {0}")]
    Core(#[from] latchkey_core::CoreError),
}

pub type ComposeResult<T> = Result<T, ComposeError>;
