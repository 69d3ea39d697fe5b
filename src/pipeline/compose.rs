use super::{BoxedMiddleware, Middleware, MiddlewareFuture, Next, PipelineError};
use futures_util::future;
use log::{debug, trace, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicIsize, Ordering};

/// State of one invocation of a [`Composed`] middleware.
pub(crate) struct Frame<C, R> {
    stack: Arc<[BoxedMiddleware<C, R>]>,
    terminal: Option<BoxedMiddleware<C, R>>,
    ctx: C,
    /// Highest index dispatched so far, `-1` before the first layer runs.
    cursor: AtomicIsize,
}

pub(crate) fn dispatch<C, R>(frame: &Arc<Frame<C, R>>, index: usize) -> MiddlewareFuture<R>
where
    C: Clone + Send + Sync + 'static,
    R: Default + Send + 'static,
{
    let slot = index as isize;
    let previous = frame.cursor.fetch_max(slot, Ordering::AcqRel);

    if previous >= slot {
        let layer = index.saturating_sub(1);
        warn!("next() called multiple times in middleware #{layer}");
        return Box::pin(future::ready(Err(PipelineError::NextCalledMultipleTimes {
            layer,
        })));
    }

    let handler = match frame.stack.get(index) {
        Some(middleware) => Some(middleware),
        None if index == frame.stack.len() => frame.terminal.as_ref(),
        None => None,
    };

    match handler {
        Some(middleware) => {
            trace!("dispatching middleware #{index}");
            middleware.call(frame.ctx.clone(), Next::new(Arc::clone(frame), index))
        }
        None => Box::pin(future::ready(Ok(R::default()))),
    }
}

/// A stack of middleware folded into a single middleware.
///
/// The stack is fixed when [`compose`] runs. Every call gets its own dispatch
/// frame, so one `Composed` can serve any number of calls, sequentially or
/// concurrently.
pub struct Composed<C, R = ()> {
    stack: Arc<[BoxedMiddleware<C, R>]>,
}

impl<C, R> Clone for Composed<C, R> {
    fn clone(&self) -> Self {
        Self {
            stack: Arc::clone(&self.stack),
        }
    }
}

impl<C, R> std::fmt::Debug for Composed<C, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Composed")
            .field("len", &self.stack.len())
            .finish()
    }
}

/// Composes `stack` into one onion-style middleware.
///
/// Layers run in order on the way in and in reverse order on the way out.
/// The input is copied: later changes to the caller's collection do not
/// affect the result.
///
/// Only collections of middleware are accepted:
///
/// ```compile_fail
/// // not a sequence
/// let composed = onion_rs::compose::<(), (), _>(42);
/// ```
///
/// ```compile_fail
/// // elements are not middleware
/// let composed: onion_rs::Composed<()> = onion_rs::compose(vec![1, 2, 3]);
/// ```
pub fn compose<C, R, I>(stack: I) -> Composed<C, R>
where
    I: IntoIterator<Item = BoxedMiddleware<C, R>>,
{
    let stack: Arc<[BoxedMiddleware<C, R>]> = stack.into_iter().collect();
    debug!("composed {} middleware", stack.len());
    Composed { stack }
}

impl<C, R> Composed<C, R> {
    /// Number of layers in the stack.
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    /// `true` when the stack has no layers.
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}

impl<C, R> Composed<C, R>
where
    C: Clone + Send + Sync + 'static,
    R: Default + Send + 'static,
{
    /// Runs the chain. Once the last layer calls through, the chain resolves
    /// with `R::default()`.
    pub fn run(&self, ctx: C) -> MiddlewareFuture<R> {
        self.start(ctx, None)
    }

    /// Runs the chain with `terminal` invoked after the last layer calls
    /// through. `terminal` receives its own `next`, which resolves with
    /// `R::default()`.
    pub fn run_with(&self, ctx: C, terminal: BoxedMiddleware<C, R>) -> MiddlewareFuture<R> {
        self.start(ctx, Some(terminal))
    }

    fn start(&self, ctx: C, terminal: Option<BoxedMiddleware<C, R>>) -> MiddlewareFuture<R> {
        let frame = Arc::new(Frame {
            stack: Arc::clone(&self.stack),
            terminal,
            ctx,
            cursor: AtomicIsize::new(-1),
        });
        dispatch(&frame, 0)
    }
}

impl<C, R> Middleware<C, R> for Composed<C, R>
where
    C: Clone + Send + Sync + 'static,
    R: Default + Send + 'static,
{
    fn call(&self, ctx: C, next: Next<C, R>) -> MiddlewareFuture<R> {
        self.start(ctx, Some(Arc::new(Resume(next))))
    }
}

/// Terminal of a nested composition: hands control back to the outer chain.
struct Resume<C, R>(Next<C, R>);

impl<C, R> Middleware<C, R> for Resume<C, R>
where
    C: Clone + Send + Sync + 'static,
    R: Default + Send + 'static,
{
    fn call(&self, _ctx: C, _next: Next<C, R>) -> MiddlewareFuture<R> {
        self.0.run()
    }
}
