use crate::pipeline::{Middleware, MiddlewareFuture, Next};
use crate::util::pretty_time;
use log::{Level, log, warn};
use std::time::Instant;

/// Middleware that logs when the rest of the chain starts and how long it
/// took once it settles.
///
/// Place it first to time the whole stack. The downstream result, value or
/// error, is passed through untouched.
///
/// Example log output:
/// ```text
/// --> checkout
/// <-- checkout 12ms
/// ```
#[derive(Debug, Clone)]
pub struct LoggingMiddleware {
    label: String,
    level: Level,
}

impl Default for LoggingMiddleware {
    fn default() -> Self {
        Self {
            label: "pipeline".to_string(),
            level: Level::Info,
        }
    }
}

impl LoggingMiddleware {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }
}

impl<C, R> Middleware<C, R> for LoggingMiddleware
where
    C: Clone + Send + Sync + 'static,
    R: Default + Send + 'static,
{
    fn call(&self, _ctx: C, next: Next<C, R>) -> MiddlewareFuture<R> {
        let label = self.label.clone();
        let level = self.level;
        let start = Instant::now();

        log!(level, "--> {label}");

        Box::pin(async move {
            let result = next.run().await;
            match &result {
                Ok(_) => log!(level, "<-- {label} {}", pretty_time(start)),
                Err(err) => warn!("<-- {label} {} failed: {err}", pretty_time(start)),
            }
            result
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{BoxedMiddleware, PipelineError, compose, from_sync_fn};
    use std::sync::Arc;

    #[tokio::test]
    async fn passes_values_through() {
        let _ = env_logger::builder().is_test(true).try_init();

        let logger: BoxedMiddleware<(), u32> = Arc::new(LoggingMiddleware::new("values"));
        let composed = compose(vec![logger, from_sync_fn(|_: ()| Ok(41))]);

        assert_eq!(composed.run(()).await.unwrap(), 41);
    }

    #[tokio::test]
    async fn passes_errors_through() {
        let _ = env_logger::builder().is_test(true).try_init();

        let logger: BoxedMiddleware<()> =
            Arc::new(LoggingMiddleware::default().level(Level::Debug));
        let composed = compose(vec![
            logger,
            from_sync_fn(|_: ()| Err(PipelineError::msg("nope"))),
        ]);

        let err = composed.run(()).await.unwrap_err();
        assert_eq!(err.to_string(), "nope");
    }
}
