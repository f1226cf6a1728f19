//! Web application router and middleware setup.

use crate::web::config::WebConfig;
use crate::web::handlers;
use crate::web::state::DashboardState;
use crate::web::websocket;
use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the dashboard application with all routes and middleware.
pub fn create_app(config: &WebConfig, state: DashboardState) -> Router {
    let mut app = Router::new()
        .route("/", get(handlers::index))
        .route("/api/fields", get(handlers::get_fields))
        .route("/api/health", get(handlers::health_check))
        .route("/ws", get(websocket::websocket_handler))
        .with_state(state);

    if config.enable_cors {
        app = app.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    app.layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}
