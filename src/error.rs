use derive_more::{Display, Error};

/// Errors surfaced by the engine's public API.
///
/// `InvalidAction` and `DeserializationError` are recoverable: the caller
/// gets a `Result` back and the prior state is untouched. `InvalidConfig`
/// is fatal at construction time. `InternalInvariant` indicates a bug in
/// this crate and should never occur in a correct implementation.
#[derive(Debug, Display, Error)]
pub enum EngineError {
    #[display(fmt = "invalid action: {}", reason)]
    InvalidAction { reason: String },

    #[display(fmt = "invalid config: {}", reason)]
    InvalidConfig { reason: String },

    #[display(fmt = "deserialization error: {}", reason)]
    DeserializationError { reason: String },

    #[display(fmt = "internal invariant violated: {}", reason)]
    InternalInvariant { reason: String },
}

impl EngineError {
    pub fn invalid_action(reason: impl Into<String>) -> EngineError {
        EngineError::InvalidAction {
            reason: reason.into(),
        }
    }

    pub fn invalid_config(reason: impl Into<String>) -> EngineError {
        EngineError::InvalidConfig {
            reason: reason.into(),
        }
    }

    pub fn deserialization(reason: impl Into<String>) -> EngineError {
        EngineError::DeserializationError {
            reason: reason.into(),
        }
    }

    pub fn internal_invariant(reason: impl Into<String>) -> EngineError {
        EngineError::InternalInvariant {
            reason: reason.into(),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
