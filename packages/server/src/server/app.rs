//! Application setup and server configuration.

use std::time::Duration;

use axum::{
    extract::Extension,
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::get,
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::kernel::ServerDeps;
use crate::server::routes::{
    followers_handler, following_handler, health_handler, notifications_handler,
    post_comments_handler, posts_handler, tags_handler, user_comments_handler,
};

/// Build the Axum application router
///
/// Handlers receive `ServerDeps` through an extension; timeouts are applied
/// here, around the whole request, never inside the pagination core.
pub fn build_app(deps: ServerDeps, config: &Config) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/posts", get(posts_handler))
        .route("/posts/:post_id/comments", get(post_comments_handler))
        .route("/tags", get(tags_handler))
        .route("/users/:user_id/comments", get(user_comments_handler))
        .route("/users/:user_id/followers", get(followers_handler))
        .route("/users/:user_id/following", get(following_handler))
        .route("/users/:user_id/notifications", get(notifications_handler))
        .layer(Extension(deps))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.request_timeout_secs,
        )))
        .layer(build_cors(&config.allowed_origins))
        .layer(TraceLayer::new_for_http())
}

fn build_cors(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET])
        .allow_headers([CONTENT_TYPE])
}
