// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::get,
};
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::{
    handlers::{comments, health},
    state::AppState,
};

/// Assembles the main application router.
///
/// * Comment API under `/comments`.
/// * Web UI from the configured static directory at `/` and `/static`.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://127.0.0.1:3000"),
        ])
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    let static_dir = state.config.static_dir.clone();
    let index = ServeFile::new(format!("{}/index.html", static_dir));

    let comment_routes = Router::new()
        .route(
            "/",
            get(comments::list_comments).post(comments::create_comment),
        )
        .route(
            "/{id}",
            get(comments::get_comment).delete(comments::delete_comment),
        );

    Router::new()
        .nest("/comments", comment_routes)
        .route("/health", get(health::health))
        .route_service("/", index)
        .nest_service("/static", ServeDir::new(static_dir))
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::Config, services::CommentTreeService, store::MemoryCommentStore};
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app() -> Router {
        create_router(AppState {
            service: CommentTreeService::new(Arc::new(MemoryCommentStore::new())),
            config: Config::default(),
        })
    }

    #[tokio::test]
    async fn health_responds_ok() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn malformed_json_is_a_client_error() {
        let response = app()
            .oneshot(
                Request::post("/comments")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn non_positive_id_is_rejected_as_json() {
        let response = app()
            .oneshot(Request::delete("/comments/0").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["error"].as_str().unwrap().contains("greater than 0"));
    }
}
