// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{auth, diagnostic, progress, questions, teacher},
    state::AppState,
    utils::jwt::{auth_middleware, teacher_middleware},
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, diagnostic, questions, progress, teacher).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (pool, config, catalog).
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let diagnostic_routes = Router::new()
        .route("/questions", get(diagnostic::get_questions))
        .route("/submit", post(diagnostic::submit_diagnostic))
        .route("/latest", get(diagnostic::get_latest))
        .route("/status", get(diagnostic::get_status))
        .route("/review", get(diagnostic::get_review))
        .route(
            "/review/{question_id}/understood",
            post(diagnostic::mark_understood),
        );

    let question_routes = Router::new()
        .route("/", get(questions::list_bank))
        .route("/recommended", get(questions::list_recommended))
        .route("/{id}/attempt", post(questions::submit_attempt));

    let progress_routes = Router::new()
        .route("/me", get(progress::get_me))
        .route("/topics", get(progress::list_topics))
        .route("/activity", get(progress::list_activity));

    // Teacher check runs after authentication (layers apply bottom-up).
    let teacher_routes = Router::new()
        .route("/students", get(teacher::list_students))
        .layer(middleware::from_fn(teacher_middleware));

    let protected = Router::new()
        .nest("/diagnostic", diagnostic_routes)
        .nest("/questions", question_routes)
        .nest("/progress", progress_routes)
        .nest("/teacher", teacher_routes)
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api", protected)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
