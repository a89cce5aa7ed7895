use crate::ports::{NotificationPermissions, PushPlatform, SubscriptionRegistrar};
use crate::types::push::SubscriberStatus;

mod subscriber;
pub(crate) mod vapid;

use std::pin::Pin;

pub use subscriber::NotificationSubscriber;
pub use vapid::decode_server_key;

/// Object-safe handle the HTTP layer uses to read and drive notifications.
pub trait NotificationControl: Send + Sync + 'static {
    fn status(&self) -> SubscriberStatus;
    fn enable(&self) -> Pin<Box<dyn Future<Output = SubscriberStatus> + Send + '_>>;
}

impl<N, P, R> NotificationControl for NotificationSubscriber<N, P, R>
where
    N: NotificationPermissions,
    P: PushPlatform,
    R: SubscriptionRegistrar,
{
    fn status(&self) -> SubscriberStatus {
        NotificationSubscriber::status(self)
    }

    fn enable(&self) -> Pin<Box<dyn Future<Output = SubscriberStatus> + Send + '_>> {
        Box::pin(NotificationSubscriber::enable(self))
    }
}
