//! Onion-style middleware composition.
//!
//! ```rust
//! use onion_rs::pipeline::{Next, PipelineError, compose, from_fn};
//! use std::sync::{Arc, Mutex};
//!
//! type Trail = Arc<Mutex<Vec<&'static str>>>;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let app = compose(vec![
//!     from_fn(|trail: Trail, next: Next<Trail>| async move {
//!         trail.lock().unwrap().push("outer in");
//!         next.run().await?;
//!         trail.lock().unwrap().push("outer out");
//!         Ok::<(), PipelineError>(())
//!     }),
//!     from_fn(|trail: Trail, next: Next<Trail>| async move {
//!         trail.lock().unwrap().push("inner");
//!         next.run().await
//!     }),
//! ]);
//!
//! let trail = Trail::default();
//! app.run(Arc::clone(&trail)).await.unwrap();
//! assert_eq!(*trail.lock().unwrap(), ["outer in", "inner", "outer out"]);
//! # });
//! ```

mod compose;
mod error;
mod middleware;
mod next;

pub use compose::{Composed, compose};
pub use error::{BoxError, PipelineError, PipelineResult};
pub use middleware::{BoxedMiddleware, Middleware, MiddlewareFuture, from_fn, from_sync_fn};
pub use next::Next;
