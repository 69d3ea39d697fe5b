//! # onion_rs
//!
//! Koa-style middleware composition for async Rust, plus a declarative
//! response description that middleware can build up as they run.
//!
//! - [`pipeline`] folds an ordered stack of [`Middleware`] into one
//!   [`Composed`] middleware with onion ordering: every layer runs code before
//!   and after the rest of the chain, return values flow back up, and errors
//!   propagate to whichever layer chooses to handle them.
//! - [`response`] describes a response as data: status, headers, cookies,
//!   body variants, merged piece by piece.
//! - [`middleware`] holds ready-made layers (timing logger, error recovery).
//! - [`util`] holds number and duration pretty-printing.
//!
//! The crate does no networking, routing or parsing.

pub mod logging;
pub mod middleware;
pub mod pipeline;
pub mod response;
pub mod util;

pub use pipeline::{
    BoxError, BoxedMiddleware, Composed, Middleware, MiddlewareFuture, Next, PipelineError,
    PipelineResult, compose, from_fn, from_sync_fn,
};
pub use response::{ResponseError, ResponseInfo};
