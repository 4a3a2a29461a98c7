//! HTTP surface: routing, error mapping and the request handlers.

mod account;
mod catalog;
mod dashboard;
mod extract;
mod orders;
mod settings;

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use crate::store::Page;
use crate::{auth, uploads, AppState, BackofficeError};

pub use extract::{FormInput, ValidJson};

/// Multipart envelope allowance on top of the largest accepted file.
const BODY_LIMIT: usize = uploads::MAX_FILE_SIZE + 64 * 1024;

pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/counts", get(dashboard::counts))
        .route("/api/reports", get(dashboard::reports))
        .route("/api/categories", get(catalog::list_categories).post(catalog::create_category))
        .route("/api/categories/:id", get(catalog::get_category).put(catalog::update_category).delete(catalog::delete_category))
        .route("/api/brands", get(catalog::list_brands).post(catalog::create_brand))
        .route("/api/brands/:id", get(catalog::get_brand).put(catalog::update_brand).delete(catalog::delete_brand))
        .route("/api/products", get(catalog::list_products).post(catalog::create_product))
        .route("/api/products/:id", get(catalog::get_product).put(catalog::update_product).delete(catalog::delete_product))
        .route("/api/orders", get(orders::list_orders).post(orders::create_order))
        .route("/api/orders/:id", get(orders::get_order).put(orders::update_order).delete(orders::delete_order))
        .route("/api/settings", get(settings::get_settings).put(settings::update_settings))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_auth));

    let upload_dir = state.config.upload_dir.clone();
    Router::new()
        .route("/health", get(dashboard::health))
        .route("/api/register", post(account::register))
        .route("/api/login", post(account::login))
        .merge(protected)
        .nest_service(uploads::PUBLIC_PREFIX, ServeDir::new(upload_dir))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

impl IntoResponse for BackofficeError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Validation(_) | Self::Duplicate(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::InvalidCredentials | Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let message = match self {
            Self::Storage(detail) => {
                tracing::error!(error = %detail, "request failed");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// List body with the unpaginated total in `X-Total-Count`.
fn listing<T: Serialize>(page: Page<T>) -> Response {
    ([("x-total-count", page.total.to_string())], Json(page.items)).into_response()
}

/// `{"message": ...}` acknowledgement body.
fn acknowledge(message: &str) -> Json<serde_json::Value> { Json(json!({ "message": message })) }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (BackofficeError::validation("bad"), StatusCode::BAD_REQUEST),
            (BackofficeError::Duplicate("Category"), StatusCode::BAD_REQUEST),
            (BackofficeError::NotFound("Brand"), StatusCode::NOT_FOUND),
            (BackofficeError::Conflict("in use".into()), StatusCode::CONFLICT),
            (BackofficeError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (BackofficeError::Storage("pool timed out".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
