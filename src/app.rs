use crate::state;

use axum::Router;
use axum::routing::get;
use axum::routing::post;

mod events;
mod push;

pub fn app(state: state::AppState) -> Router {
    Router::new()
        .route("/api/events/{category}", get(events::events_page))
        .route("/api/notifications", get(push::notification_status))
        .route(
            "/api/notifications/enable",
            post(push::enable_notifications),
        )
        .route("/health", get(health))
        .with_state(state)
}

pub(crate) async fn health() -> &'static str {
    "ok"
}
