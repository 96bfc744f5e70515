//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // The dashboard frontend is served from a different origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        .route("/options", get(handlers::get_options))
        .route("/dashboard", get(handlers::get_dashboard))
        .route("/flights", get(handlers::list_flights))
        .route("/flights/export", get(handlers::export_flights))
        .route("/aggregate", get(handlers::get_aggregate))
        .route("/refresh", post(handlers::refresh));

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_v1)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::services::DashboardSettings;
    use crate::source::{DatasetCache, SourceFactory};

    fn empty_state() -> AppState {
        AppState::new(
            SourceFactory::create_local(Vec::new()),
            DatasetCache::default(),
            DashboardSettings::default(),
        )
    }

    #[test]
    fn test_router_creation() {
        let _router = create_router(empty_state());
    }

    #[tokio::test]
    async fn test_routes_respond() {
        let router = create_router(empty_state());

        let response = router
            .clone()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = router
            .clone()
            .oneshot(Request::post("/v1/refresh").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = router
            .oneshot(Request::get("/v1/missing").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
