pub mod config;
pub mod db_types;
pub mod error;
pub mod handlers;
pub mod store;
pub mod types;
pub mod utils;

use crate::types::AppState;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod consts {
    pub const API_RUNNING: &str = "Engineer Caller Dashboard API running";
    pub const CALL_LOGGED: &str = "Call logged";
    pub const DEFAULT_LIST_LIMIT: u32 = 50;
    pub const MAX_LISTED_COLLECTIONS: usize = 10;
    pub const MAX_STATUS_DETAIL: usize = 50;
}

/// The full HTTP surface.
pub fn app(app_state: Arc<AppState>) -> Router {
    // any origin, with credentials: origins and headers are echoed back
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true);

    Router::new()
        .route("/", get(handlers::root))
        .route("/test", get(handlers::test_database))
        .route(
            "/api/calls",
            post(handlers::create_call).get(handlers::list_calls),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}
