use crate::state;
use crate::store::Page;
use crate::sync::SyncStatus;
use crate::types::events::{Category, DisasterEvent};
use crate::types::push::SubscriberStatus;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Deserialize)]
pub(crate) struct PageQuery {
    pub(crate) page: Option<usize>,
}

#[derive(Serialize)]
pub(crate) struct EventsPageResponse {
    pub(crate) category: Category,
    pub(crate) page: PageView,
    pub(crate) sync: SyncStatus,
    pub(crate) notifications: SubscriberStatus,
}

#[derive(Serialize)]
pub(crate) struct PageView {
    pub(crate) number: usize,
    pub(crate) count: usize,
    pub(crate) total: usize,
    pub(crate) events: Vec<EventView>,
}

/// An event plus the country to display; `None` when the backend did not know it.
#[derive(Serialize)]
pub(crate) struct EventView {
    #[serde(flatten)]
    pub(crate) event: DisasterEvent,
    pub(crate) country_label: Option<String>,
}

impl From<DisasterEvent> for EventView {
    fn from(event: DisasterEvent) -> Self {
        let country_label = event.country_label().map(str::to_string);
        Self {
            event,
            country_label,
        }
    }
}

impl From<Page> for PageView {
    fn from(page: Page) -> Self {
        Self {
            number: page.number,
            count: page.count,
            total: page.total,
            events: page.events.into_iter().map(EventView::from).collect(),
        }
    }
}

#[derive(Serialize)]
pub(crate) struct ErrorResponse {
    pub(crate) error: &'static str,
}

pub(crate) async fn events_page(
    State(state): State<state::AppState>,
    Path(category): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<EventsPageResponse>, (StatusCode, Json<ErrorResponse>)> {
    let category = Category::new(category);
    let Some(handle) = state.categories.get(&category) else {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "Unknown category.",
            }),
        ));
    };

    let page_number = query.page.unwrap_or(1);
    if page_number == 0 {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "page must be at least 1.",
            }),
        ));
    }

    let page = handle.read(|store| store.page(state.page_size, page_number));
    Ok(Json(EventsPageResponse {
        category,
        page: PageView::from(page),
        sync: handle.status(),
        notifications: handle.notification_status(),
    }))
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::EventView;
    use crate::app::tests::{TestNotifications, send, test_state};
    use crate::types::events::event;
    use crate::types::push::SubscriberState;
    use axum::body::Body;
    use axum::http::Request;
    use axum::http::StatusCode;
    use serde_json::json;
    use std::sync::Arc;

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn notifications() -> Arc<TestNotifications> {
        Arc::new(TestNotifications::new(SubscriberState::Default))
    }

    #[tokio::test]
    async fn events_page__should_return_first_page_by_default() {
        // Given
        let state = test_state(23, notifications()).await;

        // When
        let (status, body) = send(state, get("/api/events/earthquake")).await;

        // Then
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["category"], json!("earthquake"));
        assert_eq!(body["page"]["number"], json!(1));
        assert_eq!(body["page"]["count"], json!(3));
        assert_eq!(body["page"]["total"], json!(23));
        assert_eq!(body["page"]["events"].as_array().map(Vec::len), Some(10));
        assert_eq!(body["sync"]["loaded"], json!(true));
        assert_eq!(body["notifications"], json!({ "state": "default" }));
        assert_eq!(body["page"]["events"][0]["country"], json!("Unknown"));
        assert_eq!(body["page"]["events"][0]["country_label"], json!(null));
    }

    #[tokio::test]
    async fn events_page__should_carry_mirrored_notification_state() {
        // Given
        let state = test_state(1, Arc::new(TestNotifications::new(SubscriberState::Denied))).await;

        // When
        let (status, body) = send(state, get("/api/events/earthquake")).await;

        // Then
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["notifications"]["state"], json!("denied"));
    }

    #[test]
    fn event_view__should_label_known_country() {
        // Given
        let mut quake = event(7, "Noto Peninsula");
        quake.country = "Japan".to_string();

        // When
        let value = serde_json::to_value(EventView::from(quake)).expect("serialize view");

        // Then
        assert_eq!(value["id"], json!(7));
        assert_eq!(value["location"], json!("Noto Peninsula"));
        assert_eq!(value["country_label"], json!("Japan"));
    }

    #[tokio::test]
    async fn events_page__should_return_remainder_on_last_page() {
        // Given
        let state = test_state(23, notifications()).await;

        // When
        let (status, body) = send(state, get("/api/events/earthquake?page=3")).await;

        // Then
        assert_eq!(status, StatusCode::OK);
        let events = body["page"]["events"].as_array().expect("events array");
        assert_eq!(events.len(), 3);
        assert_eq!(events[0]["id"], json!(21));
    }

    #[tokio::test]
    async fn events_page__should_report_single_empty_page_for_empty_store() {
        // Given
        let state = test_state(0, notifications()).await;

        // When
        let (status, body) = send(state, get("/api/events/earthquake")).await;

        // Then
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["page"]["count"], json!(1));
        assert_eq!(body["page"]["events"], json!([]));
    }

    #[tokio::test]
    async fn events_page__should_reject_page_zero_and_unknown_category() {
        // Given
        let state = test_state(3, notifications()).await;

        // When
        let (zero, zero_body) = send(state.clone(), get("/api/events/earthquake?page=0")).await;
        let (unknown, _) = send(state, get("/api/events/volcano")).await;

        // Then
        assert_eq!(zero, StatusCode::BAD_REQUEST);
        assert_eq!(zero_body["error"], json!("page must be at least 1."));
        assert_eq!(unknown, StatusCode::NOT_FOUND);
    }
}
