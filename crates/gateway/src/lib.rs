//! The main HTTP API: thin handlers between clients, the BaaS row store,
//! the review document store, and the sidecar services.
//!
//! Routers mirror the service's URL surface one module per prefix; handlers
//! validate a couple of required fields, issue the store calls, reshape the
//! result, and return JSON.

mod error;
mod routes;
mod state;

use std::sync::Arc;

use {
    axum::{Router, routing::get},
    tower_http::{cors::CorsLayer, trace::TraceLayer},
};

pub use error::ApiError;
pub use state::AppState;

/// Assemble the full application router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Hello World!" }))
        .nest("/user", routes::user::router())
        .nest("/conversation", routes::conversation::router())
        .nest("/technote", routes::technote::router())
        .nest("/review", routes::review::router())
        .nest("/product", routes::product::router())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
