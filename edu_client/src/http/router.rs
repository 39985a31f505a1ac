//! Router configuration for the HTTP API.
//!
//! Sets up all routes, middleware (CORS, compression, tracing) and creates
//! the axum router ready for serving. Paths come from the resource modules
//! so the server mounts exactly what the client requests.

use axum::{
    extract::DefaultBodyLimit,
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
use crate::resources::{analytics, assessments, auth, game, learning_blocks, subjects};

/// Prefix under which the API routes are mounted.
pub const API_PREFIX: &str = "/api";

/// Largest accepted request body (material uploads).
const MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // Permissive CORS; this server is for development and tests.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        // Auth
        .route(auth::LOGIN, post(handlers::login))
        .route(auth::REGISTER, post(handlers::register))
        .route(auth::LOGOUT, post(handlers::logout))
        .route(auth::REFRESH, post(handlers::refresh_token))
        .route(auth::FORGOT_PASSWORD, post(handlers::forgot_password))
        .route(auth::RESET_PASSWORD, post(handlers::reset_password))
        // Subjects
        .route(
            subjects::SUBJECTS,
            get(handlers::list_subjects).post(handlers::create_subject),
        )
        .route(
            subjects::SUBJECT,
            get(handlers::get_subject)
                .put(handlers::update_subject)
                .delete(handlers::delete_subject),
        )
        .route(subjects::SUBJECT_MATERIALS, post(handlers::upload_material))
        // Learning blocks
        .route(learning_blocks::SUBJECT_BLOCKS, get(handlers::list_blocks))
        .route(learning_blocks::BLOCKS, post(handlers::create_block))
        .route(
            learning_blocks::BLOCK,
            get(handlers::get_block)
                .put(handlers::update_block)
                .delete(handlers::delete_block),
        )
        .route(
            learning_blocks::GENERATE_SCENARIO,
            post(handlers::generate_scenario),
        )
        // Game
        .route(
            game::GAME_STATE,
            get(handlers::get_game_state).put(handlers::update_game_state),
        )
        .route(game::ACTIVITY_ANSWER, post(handlers::submit_answer))
        .route(game::ACHIEVEMENTS, get(handlers::get_achievements))
        .route(game::LEADERBOARD, get(handlers::get_leaderboard))
        // Analytics
        .route(analytics::STUDENT_ANALYSIS, get(handlers::get_student_analysis))
        .route(analytics::CLASS_ANALYSIS, get(handlers::get_class_analysis))
        .route(analytics::LEARNING_STYLE, get(handlers::get_learning_style))
        .route(analytics::PREDICTION, get(handlers::get_performance_prediction))
        .route(analytics::RISKS, get(handlers::get_risk_analysis))
        // Tests
        .route(assessments::GENERATE_TEST, post(handlers::generate_test))
        .route(assessments::SUBMIT_TEST, post(handlers::submit_test))
        .route(assessments::TEST_RESULTS, get(handlers::get_test_results))
        .route(assessments::TEST, get(handlers::get_test));

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest(API_PREFIX, api)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::LocalRepository;
    use crate::db::repository::FullRepository;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn router() -> Router {
        let repo = Arc::new(LocalRepository::with_demo_data()) as Arc<dyn FullRepository>;
        create_router(AppState::new(repo))
    }

    #[tokio::test]
    async fn test_health_check() {
        let response = router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let health: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(health["status"], "ok");
        assert_eq!(health["repository"], "ok");
    }

    #[tokio::test]
    async fn test_protected_route_requires_token() {
        let response = router()
            .oneshot(Request::get("/api/subjects").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_static_segment_wins_over_id() {
        let response = router()
            .oneshot(
                Request::post("/api/tests/generate")
                    .header("content-type", "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        // Reaches generate_test (auth fails) rather than a 405 from GET /tests/{id}.
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let response = router()
            .oneshot(Request::get("/api/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
