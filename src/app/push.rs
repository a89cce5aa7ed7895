use crate::state;
use crate::types::push::SubscriberStatus;

use axum::Json;
use axum::extract::State;

pub(crate) async fn notification_status(
    State(state): State<state::AppState>,
) -> Json<SubscriberStatus> {
    Json(state.notifications.status())
}

/// Triggers the subscription flow; failures come back as state, not as errors.
pub(crate) async fn enable_notifications(
    State(state): State<state::AppState>,
) -> Json<SubscriberStatus> {
    Json(state.notifications.enable().await)
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use crate::app::tests::{TestNotifications, send, test_state};
    use crate::types::push::SubscriberState;
    use axum::body::Body;
    use axum::http::Request;
    use axum::http::StatusCode;
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::Ordering;

    #[tokio::test]
    async fn notification_status__should_report_current_state() {
        // Given
        let state = test_state(0, Arc::new(TestNotifications::new(SubscriberState::Denied))).await;

        // When
        let (status, body) = send(
            state,
            Request::builder()
                .uri("/api/notifications")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        // Then
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "state": "denied" }));
    }

    #[tokio::test]
    async fn enable_notifications__should_run_enable_and_return_status() {
        // Given
        let notifications = Arc::new(TestNotifications::new(SubscriberState::Default));
        let state = test_state(0, Arc::clone(&notifications)).await;

        // When
        let (status, body) = send(
            state,
            Request::builder()
                .method("POST")
                .uri("/api/notifications/enable")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        // Then
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "state": "granted" }));
        assert_eq!(notifications.enabled.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn enable_notifications__should_reject_get() {
        // Given
        let state = test_state(0, Arc::new(TestNotifications::new(SubscriberState::Default))).await;

        // When
        let (status, _) = send(
            state,
            Request::builder()
                .uri("/api/notifications/enable")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        // Then
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }
}
