use crate::pipeline::{Middleware, MiddlewareFuture, Next, PipelineError, PipelineResult};
use log::debug;
use std::sync::Arc;

/// Turns downstream failures into a value.
///
/// Duplicate `next()` calls are protocol violations, not application errors,
/// and are never recovered.
pub struct RecoverMiddleware<F> {
    handler: Arc<F>,
}

impl<F> Clone for RecoverMiddleware<F> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
        }
    }
}

pub fn recover<C, R, F>(handler: F) -> RecoverMiddleware<F>
where
    F: Fn(C, PipelineError) -> PipelineResult<R>,
{
    RecoverMiddleware {
        handler: Arc::new(handler),
    }
}

impl<C, R, F> Middleware<C, R> for RecoverMiddleware<F>
where
    C: Clone + Send + Sync + 'static,
    R: Default + Send + 'static,
    F: Fn(C, PipelineError) -> PipelineResult<R> + Send + Sync + 'static,
{
    fn call(&self, ctx: C, next: Next<C, R>) -> MiddlewareFuture<R> {
        let handler = Arc::clone(&self.handler);

        Box::pin(async move {
            match next.run().await {
                Err(err) if !err.is_multiple_next() => {
                    debug!("recovering from downstream error: {err}");
                    handler(ctx, err)
                }
                other => other,
            }
        })
    }
}
