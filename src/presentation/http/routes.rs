//! Route Configuration
//!
//! Configures all HTTP routes plus the websocket hub endpoint.

use axum::{
    middleware,
    response::IntoResponse,
    routing::{delete, get, patch, post, put},
    Router,
};

use super::handlers;
use crate::infrastructure::metrics;
use crate::presentation::hub::hub_handler;
use crate::presentation::middleware::logging::track_metrics;
use crate::presentation::middleware::{
    admin_middleware, auth_middleware, rate_limit_api, rate_limit_auth, rate_limit_hub,
    rate_limit_swipe, security_headers,
};
use crate::startup::AppState;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_routes(state.clone()))
        // Websocket hub endpoint with its own rate limiting
        .route(
            "/chathub",
            get(hub_handler).route_layer(middleware::from_fn_with_state(
                state.clone(),
                rate_limit_hub,
            )),
        )
        // Health check endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/health/live", get(handlers::health::liveness))
        .route("/health/ready", get(handlers::health::readiness))
        // Prometheus metrics endpoint
        .route("/metrics", get(metrics_handler))
        .layer(middleware::from_fn(track_metrics))
        // Security headers run outermost so every response carries them
        .layer(middleware::from_fn(security_headers))
        .with_state(state)
}

/// Prometheus metrics endpoint handler
async fn metrics_handler() -> impl IntoResponse {
    let metrics = metrics::gather_metrics();
    (
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        metrics,
    )
}

/// API v1 routes
fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Public routes (auth has its own stricter rate limiting)
        .nest("/auth", auth_routes(state.clone()))
        // Protected routes
        .nest("/students", student_routes(state.clone()))
        .nest("/prompts", prompt_catalog_routes(state.clone()))
        .nest("/interests", interest_catalog_routes(state.clone()))
        .nest("/discovery", discovery_routes(state.clone()))
        .nest("/swipes", swipe_routes(state.clone()))
        .nest("/matches", match_routes(state.clone()))
        .nest("/reports", report_routes(state.clone()))
        .nest("/blocks", block_routes(state.clone()))
        .nest("/admin", admin_routes(state.clone()))
        .route_layer(middleware::from_fn_with_state(state, rate_limit_api))
}

/// Authentication routes (public, with stricter rate limiting)
fn auth_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/refresh", post(handlers::auth::refresh_token))
        .route("/logout", post(handlers::auth::logout))
        .route_layer(middleware::from_fn_with_state(state, rate_limit_auth))
}

/// Profile, settings, photo, interest, and prompt-answer routes
fn student_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/@me", get(handlers::student::get_current_profile))
        .route("/@me", patch(handlers::student::update_current_profile))
        .route("/@me/settings", get(handlers::student::get_settings))
        .route("/@me/settings", patch(handlers::student::update_settings))
        .route("/@me/photos", post(handlers::student::add_photo))
        .route("/@me/photos/{photo_id}", delete(handlers::student::remove_photo))
        .route(
            "/@me/photos/{photo_id}/primary",
            put(handlers::student::set_primary_photo),
        )
        .route("/@me/interests", put(handlers::student::set_interests))
        .route("/@me/prompts/{prompt_id}", put(handlers::student::answer_prompt))
        .route(
            "/@me/prompts/{prompt_id}",
            delete(handlers::student::remove_prompt_answer),
        )
        .route("/{student_id}", get(handlers::student::get_student))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Prompt catalog (protected, read-only)
fn prompt_catalog_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::student::list_prompts))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Interest catalog (protected, read-only)
fn interest_catalog_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::student::list_interests))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Discovery feed routes
fn discovery_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::discovery::get_feed))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Swipe routes: the swipe limiter stacks on top of auth
fn swipe_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::swipe::create_swipe))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_swipe,
        ))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Match and message routes
fn match_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::matches::list_matches))
        .route("/{match_id}", get(handlers::matches::get_match))
        .route("/{match_id}", delete(handlers::matches::unmatch))
        .route("/{match_id}/messages", get(handlers::message::list_messages))
        .route("/{match_id}/messages", post(handlers::message::send_message))
        .route("/{match_id}/read", post(handlers::message::mark_read))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Report routes
fn report_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::moderation::create_report))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Block routes
fn block_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::moderation::list_blocks))
        .route("/", post(handlers::moderation::create_block))
        .route("/{student_id}", delete(handlers::moderation::remove_block))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Admin routes: auth then the admin-claim gate
fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/reports", get(handlers::admin::list_reports))
        .route("/reports/{report_id}/resolve", post(handlers::admin::resolve_report))
        .route("/reports/{report_id}/dismiss", post(handlers::admin::dismiss_report))
        .route("/students/{student_id}/ban", post(handlers::admin::ban_student))
        .route_layer(middleware::from_fn(admin_middleware))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
