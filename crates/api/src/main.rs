use std::sync::Arc;

use derrick_api::app::{build_app, services::AppServices};
use derrick_store::PgStore;

#[tokio::main]
async fn main() {
    derrick_observability::init();

    let session_secret = std::env::var("SESSION_SECRET").unwrap_or_else(|_| {
        tracing::warn!("SESSION_SECRET not set; using insecure dev default");
        "dev-secret".to_string()
    });

    let services = match std::env::var("DATABASE_URL") {
        Ok(url) => {
            let pool = sqlx::PgPool::connect(&url)
                .await
                .expect("failed to connect to DATABASE_URL");
            let store = Arc::new(PgStore::new(pool));
            store.migrate().await.expect("schema migration failed");
            tracing::info!("storage backend: postgres");
            AppServices::postgres(store)
        }
        Err(_) => {
            tracing::warn!("DATABASE_URL not set; using in-memory storage");
            AppServices::in_memory().0
        }
    };

    let app = build_app(&session_secret, services);

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {bind_addr}: {e}"));

    tracing::info!("listening on {}", listener.local_addr().expect("local addr"));

    axum::serve(listener, app).await.expect("server error");
}
