use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route("/api/auth/me", get(handlers::auth::me))
        .route("/api/fields", get(handlers::fields::list_fields))
        .route("/api/fields/:id", get(handlers::fields::get_field))
        .route(
            "/api/fields/:id/weather",
            get(handlers::fields::field_weather),
        )
        .route("/api/weather", get(handlers::fields::weather))
        .route(
            "/api/bookings",
            get(handlers::bookings::list_bookings).post(handlers::bookings::create_booking),
        )
        .route(
            "/api/bookings/:id/favorite",
            post(handlers::bookings::toggle_favorite),
        )
        .route("/api/favorites", get(handlers::bookings::list_favorites))
        .route("/api/admin/fields", post(handlers::admin::create_field))
        .route(
            "/api/admin/fields/:id",
            put(handlers::admin::update_field).delete(handlers::admin::delete_field),
        )
        .route("/api/admin/bookings", get(handlers::admin::get_bookings))
        .route(
            "/api/admin/bookings/export",
            get(handlers::admin::export_bookings),
        )
        .route(
            "/api/admin/bookings/:id/approve",
            post(handlers::admin::approve_booking),
        )
        .route(
            "/api/admin/bookings/:id/reject",
            post(handlers::admin::reject_booking),
        )
        .route("/api/admin/stats", get(handlers::admin::get_stats))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
