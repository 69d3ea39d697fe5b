use log::info;
use onion_rs::{
    BoxedMiddleware, Next, PipelineError, compose, from_fn, logging,
    middleware::{LoggingMiddleware, recover},
    response::{self, ResponseInfo},
};
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Response pieces collected by the layers of one call.
type Ctx = Arc<Mutex<Vec<ResponseInfo>>>;

fn add(ctx: &Ctx, piece: ResponseInfo) {
    if let Ok(mut pieces) = ctx.lock() {
        pieces.push(piece);
    }
}

#[tokio::main]
async fn main() {
    logging::init();

    let stack: Vec<BoxedMiddleware<Ctx>> = vec![
        Arc::new(LoggingMiddleware::new("demo")),
        Arc::new(recover(|ctx: Ctx, err: PipelineError| {
            add(&ctx, response::text(format!("recovered: {err}")));
            let status = response::status(500, Some("Internal Server Error"))
                .map_err(PipelineError::middleware)?;
            add(&ctx, status);
            Ok(())
        })),
        from_fn(|ctx: Ctx, next: Next<Ctx>| async move {
            next.run().await?;
            add(&ctx, response::vary(["Accept"]));
            add(
                &ctx,
                response::header("X-Powered-By", "onion_rs").map_err(PipelineError::middleware)?,
            );
            Ok::<(), PipelineError>(())
        }),
        from_fn(|ctx: Ctx, _next: Next<Ctx>| async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            let body = response::json(&json!({
                "message": "Hello from the innermost layer",
                "status": "success",
            }))
            .map_err(PipelineError::middleware)?;
            add(&ctx, body);
            add(&ctx, response::cookie("visited", 1, None));
            Ok::<(), PipelineError>(())
        }),
    ];
    let app = compose(stack);

    let ctx = Ctx::default();
    if let Err(err) = app.run(Arc::clone(&ctx)).await {
        eprintln!("pipeline error: {err}");
        return;
    }

    let pieces = match ctx.lock() {
        Ok(mut pieces) => std::mem::take(&mut *pieces),
        Err(_) => return,
    };
    let merged = response::merge(pieces);

    info!("status {}", merged.status_code());
    match merged.header_map() {
        Ok(headers) => {
            for (name, value) in &headers {
                info!("{name}: {}", value.to_str().unwrap_or("<binary>"));
            }
        }
        Err(err) => eprintln!("invalid headers: {err}"),
    }
    if let Ok(cookies) = merged.set_cookie_headers() {
        for cookie in cookies {
            info!("set-cookie: {}", cookie.to_str().unwrap_or("<binary>"));
        }
    }
    info!("body: {:?}", merged.body);
}
