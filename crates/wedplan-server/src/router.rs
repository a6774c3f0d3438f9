//! HTTP router setup.

use axum::Router;
use axum::extract::OriginalUri;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::routes;
use crate::state::AppState;
use crate::upload::PUBLIC_PREFIX;

/// Build the application router: the API under `/api` and stored
/// payment proofs under `/uploads`.
pub fn app_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/", get(liveness))
        .merge(routes::auth::routes())
        .merge(routes::catalog::routes())
        .merge(routes::client::routes(&state))
        .merge(routes::admin::routes(&state));

    Router::new()
        .nest("/api", api)
        .nest_service(
            &format!("/{PUBLIC_PREFIX}"),
            ServeDir::new(state.proofs.dir()),
        )
        .fallback(not_found)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn liveness() -> &'static str {
    "wedplan API is running"
}

async fn not_found(uri: OriginalUri) -> ApiError {
    ApiError::NotFound {
        message: format!("not found: {}", uri.0.path()),
    }
}
