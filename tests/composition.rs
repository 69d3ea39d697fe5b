//! Integration tests for composing middleware through the public API.

use onion_rs::middleware::{LoggingMiddleware, recover};
use onion_rs::response::{self, Body, ResponseInfo};
use onion_rs::{BoxedMiddleware, Composed, Next, PipelineError, compose, from_fn, from_sync_fn};
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Trail = Arc<Mutex<Vec<String>>>;

fn mark(trail: &Trail, entry: impl Into<String>) {
    trail.lock().unwrap().push(entry.into());
}

fn named(name: &'static str) -> BoxedMiddleware<Trail> {
    from_fn(move |trail: Trail, next: Next<Trail>| async move {
        mark(&trail, format!("{name}:before"));
        tokio::time::sleep(Duration::from_millis(1)).await;
        next.run().await?;
        mark(&trail, format!("{name}:after"));
        Ok::<(), PipelineError>(())
    })
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn spawned_calls_keep_their_own_ordering() {
    let app: Composed<Trail> = compose(vec![named("a"), named("b"), named("c")]);

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let app = app.clone();
            let trail = Trail::default();
            tokio::spawn(async move {
                app.run(Arc::clone(&trail)).await.map(|()| trail)
            })
        })
        .collect();

    for handle in handles {
        let trail = handle.await.unwrap().unwrap();
        assert_eq!(
            *trail.lock().unwrap(),
            [
                "a:before", "b:before", "c:before", "c:after", "b:after", "a:after"
            ]
        );
    }
}

#[tokio::test]
async fn deeply_nested_compositions_flatten() {
    let trail = Trail::default();
    let inner: BoxedMiddleware<Trail> = Arc::new(compose(vec![named("b"), named("c")]));
    let middle: BoxedMiddleware<Trail> = Arc::new(compose(vec![inner, named("d")]));
    let outer = compose(vec![named("a"), middle, named("e")]);

    outer.run(Arc::clone(&trail)).await.unwrap();

    let seen = trail.lock().unwrap().clone();
    let expected: Vec<String> = ["a", "b", "c", "d", "e"]
        .iter()
        .map(|n| format!("{n}:before"))
        .chain(
            ["e", "d", "c", "b", "a"]
                .iter()
                .map(|n| format!("{n}:after")),
        )
        .collect();
    assert_eq!(seen, expected);
}

#[tokio::test]
async fn one_middleware_in_two_stacks_is_guarded_per_frame() {
    let shared = named("shared");
    let first = compose(vec![Arc::clone(&shared), named("x")]);
    let second = compose(vec![named("y"), shared]);

    let a = Trail::default();
    let b = Trail::default();
    first.run(Arc::clone(&a)).await.unwrap();
    second.run(Arc::clone(&b)).await.unwrap();

    assert_eq!(a.lock().unwrap().len(), 4);
    assert_eq!(b.lock().unwrap().len(), 4);
}

#[tokio::test]
async fn error_unwinds_to_the_outermost_caller() {
    let trail = Trail::default();
    let app = compose(vec![
        named("a"),
        named("b"),
        from_sync_fn(|trail: Trail| {
            mark(&trail, "boom");
            Err(PipelineError::msg("handler failed"))
        }),
    ]);

    let err = app.run(Arc::clone(&trail)).await.unwrap_err();

    assert_eq!(err.to_string(), "handler failed");
    assert_eq!(
        *trail.lock().unwrap(),
        ["a:before", "b:before", "boom"]
    );
}

type Pieces = Arc<Mutex<Vec<ResponseInfo>>>;

#[tokio::test]
async fn builds_a_response_description_across_layers() {
    let _ = env_logger::builder().is_test(true).try_init();

    let stack: Vec<BoxedMiddleware<Pieces>> = vec![
        Arc::new(LoggingMiddleware::new("response")),
        Arc::new(recover(|pieces: Pieces, err: PipelineError| {
            pieces.lock().unwrap().push(response::text(err.to_string()));
            let status = response::status(500, None).map_err(PipelineError::middleware)?;
            pieces.lock().unwrap().push(status);
            Ok(())
        })),
        from_fn(|pieces: Pieces, next: Next<Pieces>| async move {
            next.run().await?;
            let header = response::header("x-layer", "outer").map_err(PipelineError::middleware)?;
            pieces.lock().unwrap().push(header);
            Ok::<(), PipelineError>(())
        }),
        from_sync_fn(|_: Pieces| Err(PipelineError::msg("database unavailable"))),
    ];

    let pieces = Pieces::default();
    compose(stack).run(Arc::clone(&pieces)).await.unwrap();

    let merged = response::merge(std::mem::take(&mut *pieces.lock().unwrap()));
    assert_eq!(merged.status_code().as_u16(), 500);
    assert!(matches!(merged.body, Some(Body::Text(ref t)) if t == "database unavailable"));
    // the layer below `recover` never reached its post-next code
    assert!(merged.headers.is_none());
}
