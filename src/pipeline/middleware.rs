use super::{Next, PipelineResult};
use futures_util::future::{self, BoxFuture};
use std::sync::Arc;

/// Deferred result of a middleware call.
pub type MiddlewareFuture<R> = BoxFuture<'static, PipelineResult<R>>;

/// A layer of the onion.
///
/// `ctx` is the caller's context, cloned for every layer. Use a handle type
/// (`Arc<...>`) when layers need to share mutable state: every clone then
/// points at the same value. `next` resumes the remainder of the chain and
/// resolves with whatever the inner layers returned.
pub trait Middleware<C, R = ()>: Send + Sync + 'static {
    fn call(&self, ctx: C, next: Next<C, R>) -> MiddlewareFuture<R>;
}

/// Shared, type-erased middleware as stored in a stack.
pub type BoxedMiddleware<C, R = ()> = Arc<dyn Middleware<C, R>>;

/// Blanket impl for closures or functions that match the async signature.
impl<C, R, F, Fut> Middleware<C, R> for F
where
    F: Fn(C, Next<C, R>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = PipelineResult<R>> + Send + 'static,
{
    fn call(&self, ctx: C, next: Next<C, R>) -> MiddlewareFuture<R> {
        Box::pin((self)(ctx, next))
    }
}

/// Boxes an async closure into a stack entry.
pub fn from_fn<C, R, F, Fut>(func: F) -> BoxedMiddleware<C, R>
where
    C: 'static,
    R: 'static,
    F: Fn(C, Next<C, R>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = PipelineResult<R>> + Send + 'static,
{
    Arc::new(func)
}

/// Boxes a synchronous leaf handler. It never continues the chain; its
/// result, `Ok` or `Err`, is handed back as an already-settled future.
pub fn from_sync_fn<C, R, F>(func: F) -> BoxedMiddleware<C, R>
where
    C: 'static,
    R: Send + 'static,
    F: Fn(C) -> PipelineResult<R> + Send + Sync + 'static,
{
    Arc::new(SyncFn(func))
}

struct SyncFn<F>(F);

impl<C, R, F> Middleware<C, R> for SyncFn<F>
where
    C: 'static,
    R: Send + 'static,
    F: Fn(C) -> PipelineResult<R> + Send + Sync + 'static,
{
    fn call(&self, ctx: C, _next: Next<C, R>) -> MiddlewareFuture<R> {
        Box::pin(future::ready((self.0)(ctx)))
    }
}
