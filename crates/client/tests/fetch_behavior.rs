use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use derrick_client::{FetchError, Fetcher, RetryPolicy, UserAction};

async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind ephemeral port");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn fast_policy() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::from_millis(10),
        request_timeout: Duration::from_secs(2),
    }
}

#[tokio::test]
async fn transient_server_errors_are_retried() {
    let hits = Arc::new(AtomicU32::new(0));
    let router = Router::new().route(
        "/flaky",
        get(|State(hits): State<Arc<AtomicU32>>| async move {
            if hits.fetch_add(1, Ordering::SeqCst) < 2 {
                (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({
                    "error": "storage_error",
                    "message": "storage backend failure",
                })))
                    .into_response()
            } else {
                Json(json!({ "wells": [] })).into_response()
            }
        }),
    )
    .with_state(hits.clone());

    let base = spawn(router).await;
    let fetcher = Fetcher::new(base).with_policy(fast_policy());

    let body = fetcher.fetch_json("wells", "/flaky").await.unwrap();
    assert!(body["wells"].as_array().unwrap().is_empty());
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn retry_budget_is_bounded() {
    let hits = Arc::new(AtomicU32::new(0));
    let router = Router::new().route(
        "/down",
        get(|State(hits): State<Arc<AtomicU32>>| async move {
            hits.fetch_add(1, Ordering::SeqCst);
            (StatusCode::SERVICE_UNAVAILABLE, Json(json!({
                "error": "storage_error",
                "message": "unavailable",
            })))
        }),
    )
    .with_state(hits.clone());

    let base = spawn(router).await;
    let fetcher = Fetcher::new(base).with_policy(fast_policy());

    let err = fetcher.fetch_json("wells", "/down").await.unwrap_err();
    assert!(matches!(err, FetchError::Server { status: 503, .. }));
    assert_eq!(err.user_action(), UserAction::Retry);
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn unauthenticated_is_terminal_and_routes_to_login() {
    let hits = Arc::new(AtomicU32::new(0));
    let router = Router::new().route(
        "/secure",
        get(|State(hits): State<Arc<AtomicU32>>| async move {
            hits.fetch_add(1, Ordering::SeqCst);
            (StatusCode::UNAUTHORIZED, Json(json!({
                "error": "unauthenticated",
                "message": "not authenticated",
            })))
        }),
    )
    .with_state(hits.clone());

    let base = spawn(router).await;
    let fetcher = Fetcher::new(base).with_policy(fast_policy());

    let err = fetcher.fetch_json("wells", "/secure").await.unwrap_err();
    assert_eq!(err, FetchError::Unauthenticated);
    assert_eq!(err.user_action(), UserAction::SignIn);
    // No retry for authorization failures.
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn needs_setup_routes_to_setup_not_login() {
    let router = Router::new().route(
        "/wells",
        get(|| async {
            (StatusCode::FORBIDDEN, Json(json!({
                "error": "needs_setup",
                "message": "account setup incomplete",
            })))
        }),
    );

    let base = spawn(router).await;
    let fetcher = Fetcher::new(base).with_policy(fast_policy());

    let err = fetcher.fetch_json("wells", "/wells").await.unwrap_err();
    assert_eq!(err, FetchError::NeedsSetup);
    assert_eq!(err.user_action(), UserAction::CompleteSetup);
}

#[tokio::test]
async fn newer_fetch_for_same_resource_wins() {
    let hits = Arc::new(AtomicU32::new(0));
    let router = Router::new().route(
        "/wells",
        get(|State(hits): State<Arc<AtomicU32>>| async move {
            // First request hangs; later ones answer immediately.
            if hits.fetch_add(1, Ordering::SeqCst) == 0 {
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
            Json(json!({ "wells": ["Smith #1"] }))
        }),
    )
    .with_state(hits.clone());

    let base = spawn(router).await;
    let fetcher = Fetcher::new(base).with_policy(fast_policy());

    let older = {
        let fetcher = fetcher.clone();
        tokio::spawn(async move { fetcher.fetch_json("wells", "/wells").await })
    };
    // Let the first request get in flight before superseding it.
    tokio::time::sleep(Duration::from_millis(100)).await;

    let newer = fetcher.fetch_json("wells", "/wells").await;
    assert!(newer.is_ok());

    let older = older.await.unwrap();
    assert_eq!(older.unwrap_err(), FetchError::Cancelled);
}

#[tokio::test]
async fn slow_responses_hit_the_attempt_timeout() {
    let hits = Arc::new(AtomicU32::new(0));
    let router = Router::new().route(
        "/hang",
        get(|State(hits): State<Arc<AtomicU32>>| async move {
            hits.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({}))
        }),
    )
    .with_state(hits.clone());

    let base = spawn(router).await;
    let fetcher = Fetcher::new(base).with_policy(RetryPolicy {
        max_attempts: 2,
        base_delay: Duration::from_millis(10),
        request_timeout: Duration::from_millis(200),
    });

    let err = fetcher.fetch_json("wells", "/hang").await.unwrap_err();
    assert_eq!(err, FetchError::Timeout);
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}
