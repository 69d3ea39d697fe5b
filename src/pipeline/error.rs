use std::error::Error as StdError;
use thiserror::Error;

/// Boxed application error carried through the chain untouched.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Errors surfaced by a composed middleware call.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A layer invoked its `next` more than once within one dispatch frame.
    #[error("next() called multiple times in middleware #{layer}")]
    NextCalledMultipleTimes { layer: usize },

    /// Anything a middleware failed with. The engine never inspects it.
    #[error("{0}")]
    Middleware(BoxError),
}

impl PipelineError {
    /// Wraps an application error so it can travel up the chain.
    pub fn middleware<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        PipelineError::Middleware(err.into())
    }

    /// Shorthand for a plain-message application error.
    pub fn msg(message: impl Into<String>) -> Self {
        let message: String = message.into();
        PipelineError::Middleware(message.into())
    }

    pub fn is_multiple_next(&self) -> bool {
        matches!(self, PipelineError::NextCalledMultipleTimes { .. })
    }

    /// Returns the wrapped application error if it is of type `E`.
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        match self {
            PipelineError::Middleware(inner) => inner.downcast_ref::<E>(),
            PipelineError::NextCalledMultipleTimes { .. } => None,
        }
    }
}

/// Result type for middleware operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
