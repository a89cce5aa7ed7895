use crate::error::SubscriptionError;
use crate::ports::{NotificationPermissions, PushPlatform, SubscriptionRegistrar};
use crate::push::vapid::{ServerKeyStatus, load_server_key};
use crate::types::push::{Permission, SubscribeOptions, SubscriberState, SubscriberStatus};

use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Drives permission, platform subscription and backend registration on
/// explicit user request.
pub struct NotificationSubscriber<N, P, R> {
    permissions: N,
    platform: P,
    registrar: R,
    server_key: Option<Vec<u8>>,
    status: watch::Sender<SubscriberStatus>,
}

impl<N, P, R> NotificationSubscriber<N, P, R>
where
    N: NotificationPermissions,
    P: PushPlatform,
    R: SubscriptionRegistrar,
{
    pub fn new(permissions: N, platform: P, registrar: R, server_key: Option<&str>) -> Self {
        let (server_key, initial) = match load_server_key(server_key) {
            ServerKeyStatus::Ready(key) if platform.is_supported() => {
                let state = SubscriberState::from(permissions.current_permission());
                (Some(key), SubscriberStatus::new(state))
            }
            ServerKeyStatus::Ready(_) => (
                None,
                SubscriberStatus::with_message(
                    SubscriberState::Unsupported,
                    "push messaging is not available on this platform",
                ),
            ),
            ServerKeyStatus::Missing => (
                None,
                SubscriberStatus::with_message(
                    SubscriberState::Unsupported,
                    "no application server key configured",
                ),
            ),
            ServerKeyStatus::Invalid(err) => (
                None,
                SubscriberStatus::with_message(SubscriberState::Unsupported, err.to_string()),
            ),
        };
        info!(state = %initial.state, "notification subscriber initialized");
        let (status, _) = watch::channel(initial);
        Self {
            permissions,
            platform,
            registrar,
            server_key,
            status,
        }
    }

    pub fn status(&self) -> SubscriberStatus {
        self.status.borrow().clone()
    }

    /// Read-only view of the status for other components.
    pub fn watch_status(&self) -> watch::Receiver<SubscriberStatus> {
        self.status.subscribe()
    }

    /// Runs the subscription flow when the state allows it and returns the
    /// resulting status. Calls from any other state leave it untouched.
    pub async fn enable(&self) -> SubscriberStatus {
        if !self.begin() {
            debug!(state = %self.status.borrow().state, "ignoring enable request");
            return self.status();
        }

        let permission = self.permissions.request_permission().await;
        if permission != Permission::Granted {
            info!(?permission, "notification permission not granted");
            return self.finish(SubscriberStatus::with_message(
                SubscriberState::Denied,
                "notification permission was not granted",
            ));
        }

        match self.subscribe_and_register().await {
            Ok(()) => {
                info!("subscribed to push notifications");
                self.finish(SubscriberStatus::new(SubscriberState::Granted))
            }
            Err(err) => {
                warn!(error = %err, "failed to enable notifications");
                self.finish(SubscriberStatus::with_message(
                    SubscriberState::Failed,
                    err.to_string(),
                ))
            }
        }
    }

    fn begin(&self) -> bool {
        if self.server_key.is_none() {
            return false;
        }
        self.status.send_if_modified(|status| {
            if !status.state.can_enable() {
                return false;
            }
            *status = SubscriberStatus::new(SubscriberState::Requesting);
            true
        })
    }

    fn finish(&self, status: SubscriberStatus) -> SubscriberStatus {
        self.status.send_replace(status.clone());
        status
    }

    async fn subscribe_and_register(&self) -> Result<(), SubscriptionError> {
        let Some(server_key) = self.server_key.clone() else {
            return Err(SubscriptionError::Subscribe(
                "no application server key configured".to_string(),
            ));
        };

        self.platform
            .ready()
            .await
            .map_err(|err| SubscriptionError::NotReady(err.to_string()))?;

        let options = SubscribeOptions {
            user_visible_only: true,
            application_server_key: server_key,
        };
        let subscription = self
            .platform
            .subscribe(&options)
            .await
            .map_err(|err| SubscriptionError::Subscribe(err.to_string()))?;

        if let Err(err) = self.registrar.register(&subscription).await {
            // Leave no platform subscription the backend does not know about.
            if let Err(rollback) = self.platform.unsubscribe(&subscription).await {
                warn!(
                    error = %rollback,
                    endpoint = %subscription.endpoint,
                    "failed to roll back push subscription"
                );
            }
            return Err(SubscriptionError::Registration(err.to_string()));
        }
        Ok(())
    }
}
