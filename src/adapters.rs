use std::pin::Pin;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use thiserror::Error;
use time::OffsetDateTime;
use tracing::info;

use crate::config::{ProvisionedSubscription, PushConfig};
use crate::error::{BackendError, ServerKeyError};
use crate::ports;
use crate::push::vapid::check_server_key;
use crate::types::events::{Category, DisasterEvent};
use crate::types::push::{Permission, PushSubscriptionRecord, SubscribeOptions};

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimeProvider;

impl ports::TimeProvider for TokioTimeProvider {
    type Sleep<'a>
        = tokio::time::Sleep
    where
        Self: 'a;

    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }

    fn sleep<'a>(&'a self, duration: Duration) -> Self::Sleep<'a> {
        tokio::time::sleep(duration)
    }
}

/// Client of the disaster backend: bulk event fetch and push registration.
#[derive(Clone)]
pub struct HttpBackend {
    base_url: Arc<str>,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;
        Ok(Self::with_client(base_url, client))
    }

    pub fn with_client(base_url: &str, client: reqwest::Client) -> Self {
        Self {
            base_url: Arc::from(base_url.trim_end_matches('/')),
            client,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

impl ports::EventSource for HttpBackend {
    type Error = BackendError;
    type Fut<'a>
        = Pin<Box<dyn Future<Output = Result<Vec<DisasterEvent>, Self::Error>> + Send + 'a>>
    where
        Self: 'a;

    fn fetch_events<'a>(&'a self, category: &'a Category) -> Self::Fut<'a> {
        Box::pin(async move {
            let response = self
                .client
                .get(self.url(&format!("events/{category}")))
                .send()
                .await?;
            if !response.status().is_success() {
                return Err(BackendError::Status(response.status()));
            }
            Ok(response.json().await?)
        })
    }
}

impl ports::SubscriptionRegistrar for HttpBackend {
    type Error = BackendError;
    type Fut<'a>
        = Pin<Box<dyn Future<Output = Result<(), Self::Error>> + Send + 'a>>
    where
        Self: 'a;

    fn register<'a>(&'a self, subscription: &'a PushSubscriptionRecord) -> Self::Fut<'a> {
        Box::pin(async move {
            let response = self
                .client
                .post(self.url("subscribe"))
                .json(subscription)
                .send()
                .await?;
            if !response.status().is_success() {
                return Err(BackendError::Status(response.status()));
            }
            Ok(())
        })
    }
}

#[derive(Debug, Clone, Error)]
pub enum PlatformError {
    #[error("no push subscription has been provisioned")]
    NotProvisioned,

    #[error("only user-visible push subscriptions are supported")]
    SilentPush,

    #[error(transparent)]
    ServerKey(#[from] ServerKeyError),
}

/// Push platform whose subscription is issued by an external push
/// distributor and handed to this process through configuration.
#[derive(Clone)]
pub struct ProvisionedPushPlatform {
    subscription: Option<ProvisionedSubscription>,
    permission: Arc<Mutex<Permission>>,
    grant_on_request: bool,
}

impl ProvisionedPushPlatform {
    pub fn from_config(config: &PushConfig) -> Self {
        Self {
            subscription: config.subscription.clone(),
            permission: Arc::new(Mutex::new(config.permission)),
            grant_on_request: config.grant_on_request,
        }
    }
}

impl ports::NotificationPermissions for ProvisionedPushPlatform {
    type Fut<'a>
        = std::future::Ready<Permission>
    where
        Self: 'a;

    fn current_permission(&self) -> Permission {
        *self.permission.lock().expect("permission lock")
    }

    fn request_permission<'a>(&'a self) -> Self::Fut<'a> {
        let mut permission = self.permission.lock().expect("permission lock");
        if *permission == Permission::Default {
            *permission = if self.grant_on_request {
                Permission::Granted
            } else {
                Permission::Denied
            };
        }
        std::future::ready(*permission)
    }
}

impl ports::PushPlatform for ProvisionedPushPlatform {
    type Error = PlatformError;
    type Fut<'a, T>
        = Pin<Box<dyn Future<Output = Result<T, Self::Error>> + Send + 'a>>
    where
        Self: 'a,
        T: 'a;

    fn is_supported(&self) -> bool {
        self.subscription.is_some()
    }

    fn ready<'a>(&'a self) -> Self::Fut<'a, ()> {
        Box::pin(async { Ok(()) })
    }

    fn subscribe<'a>(
        &'a self,
        options: &'a SubscribeOptions,
    ) -> Self::Fut<'a, PushSubscriptionRecord> {
        Box::pin(async move {
            let subscription = self
                .subscription
                .as_ref()
                .ok_or(PlatformError::NotProvisioned)?;
            if !options.user_visible_only {
                return Err(PlatformError::SilentPush);
            }
            check_server_key(&options.application_server_key)?;
            Ok(PushSubscriptionRecord::new(
                subscription.endpoint.clone(),
                subscription.p256dh.clone(),
                subscription.auth.clone(),
            ))
        })
    }

    fn unsubscribe<'a>(&'a self, subscription: &'a PushSubscriptionRecord) -> Self::Fut<'a, ()> {
        Box::pin(async move {
            // The distributor owns the endpoint; there is nothing to tear down locally.
            info!(endpoint = %subscription.endpoint, "dropped provisioned push subscription");
            Ok(())
        })
    }
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;
    use crate::ports::{EventSource, NotificationPermissions, PushPlatform, SubscriptionRegistrar};
    use crate::push::decode_server_key;
    use crate::push::vapid::TEST_SERVER_KEY;
    use axum::Json;
    use axum::Router;
    use axum::extract::{Path, State};
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use serde_json::{Value, json};

    type Received = Arc<Mutex<Vec<Value>>>;

    async fn events(Path(category): Path<String>) -> Result<Json<Value>, StatusCode> {
        if category != "earthquake" {
            return Err(StatusCode::NOT_FOUND);
        }
        Ok(Json(json!([
            { "id": 1, "type": "earthquake", "location": "Ridgecrest", "country": "United States", "magnitude": 4.4 },
            { "id": "ak0252", "type": "earthquake", "location": "Anchorage", "country": "Unknown" }
        ])))
    }

    async fn subscribe(State(received): State<Received>, Json(body): Json<Value>) -> StatusCode {
        let reject = body["endpoint"] == json!("https://push.example/reject");
        received.lock().expect("received lock").push(body);
        if reject {
            StatusCode::INTERNAL_SERVER_ERROR
        } else {
            StatusCode::CREATED
        }
    }

    async fn spawn_backend() -> (HttpBackend, Received) {
        let received = Received::default();
        let router = Router::new()
            .route("/events/{category}", get(events))
            .route("/subscribe", post(subscribe))
            .with_state(Arc::clone(&received));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind backend");
        let addr = listener.local_addr().expect("backend addr");
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("backend server");
        });
        let client = reqwest::Client::builder()
            .no_proxy()
            .build()
            .expect("build client");
        let backend = HttpBackend::with_client(&format!("http://{addr}/"), client);
        (backend, received)
    }

    fn record(endpoint: &str) -> PushSubscriptionRecord {
        PushSubscriptionRecord::new(endpoint, "p256dh-key", "auth-secret")
    }

    #[tokio::test]
    async fn http_backend__should_fetch_events_for_category() {
        // Given
        let (backend, _) = spawn_backend().await;

        // When
        let events = backend
            .fetch_events(&Category::new("earthquake"))
            .await
            .expect("fetch events");

        // Then
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].location, "Ridgecrest");
        assert_eq!(events[1].id.to_string(), "ak0252");
        assert_eq!(events[1].country_label(), None);
    }

    #[tokio::test]
    async fn http_backend__should_fail_on_non_success_status() {
        // Given
        let (backend, _) = spawn_backend().await;

        // When
        let result = backend.fetch_events(&Category::new("volcano")).await;

        // Then
        assert!(matches!(
            result,
            Err(BackendError::Status(status)) if status == reqwest::StatusCode::NOT_FOUND
        ));
    }

    #[tokio::test]
    async fn http_backend__should_post_subscription_record() {
        // Given
        let (backend, received) = spawn_backend().await;

        // When
        backend
            .register(&record("https://push.example/ok"))
            .await
            .expect("register");

        // Then
        let received = received.lock().expect("received lock");
        assert_eq!(
            received.as_slice(),
            [json!({
                "endpoint": "https://push.example/ok",
                "keys": { "p256dh": "p256dh-key", "auth": "auth-secret" }
            })]
        );
    }

    #[tokio::test]
    async fn http_backend__should_report_rejected_registration() {
        // Given
        let (backend, _) = spawn_backend().await;

        // When
        let result = backend.register(&record("https://push.example/reject")).await;

        // Then
        assert!(matches!(result, Err(BackendError::Status(_))));
    }

    fn provisioned(permission: Permission, grant_on_request: bool) -> ProvisionedPushPlatform {
        ProvisionedPushPlatform::from_config(&PushConfig {
            subscription: Some(ProvisionedSubscription {
                endpoint: "https://push.example/device".to_string(),
                p256dh: "p256dh-key".to_string(),
                auth: "auth-secret".to_string(),
            }),
            permission,
            grant_on_request,
        })
    }

    #[tokio::test]
    async fn provisioned_platform__should_resolve_default_permission_once() {
        // Given
        let platform = provisioned(Permission::Default, true);

        // When
        let answer = platform.request_permission().await;

        // Then
        assert_eq!(answer, Permission::Granted);
        assert_eq!(platform.current_permission(), Permission::Granted);

        let declined = provisioned(Permission::Default, false);
        assert_eq!(declined.request_permission().await, Permission::Denied);
        let denied = provisioned(Permission::Denied, true);
        assert_eq!(denied.request_permission().await, Permission::Denied);
    }

    #[tokio::test]
    async fn provisioned_platform__should_issue_configured_subscription() {
        // Given
        let platform = provisioned(Permission::Granted, false);
        let options = SubscribeOptions {
            user_visible_only: true,
            application_server_key: decode_server_key(TEST_SERVER_KEY).expect("decode key"),
        };

        // When
        platform.ready().await.expect("ready");
        let subscription = platform.subscribe(&options).await.expect("subscribe");

        // Then
        assert_eq!(subscription.endpoint, "https://push.example/device");
        assert_eq!(subscription.keys.p256dh, "p256dh-key");
        assert_eq!(subscription.keys.auth, "auth-secret");
    }

    #[tokio::test]
    async fn provisioned_platform__should_reject_malformed_server_key() {
        // Given
        let platform = provisioned(Permission::Granted, false);
        let options = SubscribeOptions {
            user_visible_only: true,
            application_server_key: vec![4, 2],
        };

        // When
        let result = platform.subscribe(&options).await;

        // Then
        assert!(matches!(
            result,
            Err(PlatformError::ServerKey(ServerKeyError::Length(2)))
        ));
    }

    #[test]
    fn provisioned_platform__should_be_unsupported_without_subscription() {
        let platform = ProvisionedPushPlatform::from_config(&PushConfig::default());
        assert!(!platform.is_supported());
        assert!(provisioned(Permission::Default, false).is_supported());
    }
}
