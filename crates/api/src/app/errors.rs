use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use derrick_auth::AccessError;
use derrick_store::StoreError;

/// Map an access-control error to its terminal HTTP response.
pub fn access_error_response(err: &AccessError) -> axum::response::Response {
    let status = match err {
        AccessError::Unauthenticated => StatusCode::UNAUTHORIZED,
        AccessError::NeedsSetup | AccessError::IsolationViolation => StatusCode::FORBIDDEN,
        AccessError::Validation(_) => StatusCode::BAD_REQUEST,
        AccessError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    // NeedsSetup carries a hint so the client can route to the setup flow
    // rather than the login page.
    if matches!(err, AccessError::NeedsSetup) {
        return (
            status,
            axum::Json(json!({
                "error": err.code(),
                "message": err.to_string(),
                "hint": "complete setup via POST /api/setup",
            })),
        )
            .into_response();
    }

    json_error(status, err.code(), err.to_string())
}

/// Map a storage error: scoped not-found becomes 404 (indistinguishable from
/// a foreign-tenant id by construction), the rest are 500s.
pub fn store_error_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "record not found"),
        other => access_error_response(&AccessError::from(other)),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
