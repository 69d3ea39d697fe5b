use super::compose::{Frame, dispatch};
use super::MiddlewareFuture;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Continuation handed to the middleware at `index`.
///
/// Clones share the "called" flag, so cloning does not buy a second advance:
/// the frame cursor rejects any repeat with
/// [`PipelineError::NextCalledMultipleTimes`](super::PipelineError::NextCalledMultipleTimes).
pub struct Next<C, R = ()> {
    frame: Arc<Frame<C, R>>,
    index: usize,
    called: Arc<AtomicBool>,
}

impl<C, R> Clone for Next<C, R> {
    fn clone(&self) -> Self {
        Self {
            frame: Arc::clone(&self.frame),
            index: self.index,
            called: Arc::clone(&self.called),
        }
    }
}

impl<C, R> Next<C, R>
where
    C: Clone + Send + Sync + 'static,
    R: Default + Send + 'static,
{
    pub(crate) fn new(frame: Arc<Frame<C, R>>, index: usize) -> Self {
        Self {
            frame,
            index,
            called: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Dispatches the next layer and returns its deferred result.
    pub fn run(&self) -> MiddlewareFuture<R> {
        self.called.store(true, Ordering::Release);
        dispatch(&self.frame, self.index + 1)
    }
}

impl<C, R> Next<C, R> {
    /// Position of the layer owning this continuation. Equal to the stack
    /// length for the terminal continuation.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn was_called(&self) -> bool {
        self.called.load(Ordering::Acquire)
    }
}

impl<C, R> std::fmt::Debug for Next<C, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Next")
            .field("index", &self.index)
            .field("called", &self.was_called())
            .finish()
    }
}
