use crate::types::push::{Permission, PushSubscriptionRecord, SubscribeOptions};

pub trait NotificationPermissions: Clone + Send + Sync + 'static {
    type Fut<'a>: Future<Output = Permission> + Send + 'a
    where
        Self: 'a;

    fn current_permission(&self) -> Permission;
    fn request_permission<'a>(&'a self) -> Self::Fut<'a>;
}

pub trait PushPlatform: Clone + Send + Sync + 'static {
    type Error: std::fmt::Display + Send + Sync + 'static;
    type Fut<'a, T>: Future<Output = Result<T, Self::Error>> + Send + 'a
    where
        Self: 'a,
        T: 'a;

    /// Whether the platform can deliver push messages at all.
    fn is_supported(&self) -> bool;
    /// Resolves once the worker that receives pushes is active.
    fn ready<'a>(&'a self) -> Self::Fut<'a, ()>;
    fn subscribe<'a>(
        &'a self,
        options: &'a SubscribeOptions,
    ) -> Self::Fut<'a, PushSubscriptionRecord>;
    fn unsubscribe<'a>(&'a self, subscription: &'a PushSubscriptionRecord) -> Self::Fut<'a, ()>;
}

pub trait SubscriptionRegistrar: Clone + Send + Sync + 'static {
    type Error: std::fmt::Display + Send + Sync + 'static;
    type Fut<'a>: Future<Output = Result<(), Self::Error>> + Send + 'a
    where
        Self: 'a;

    fn register<'a>(&'a self, subscription: &'a PushSubscriptionRecord) -> Self::Fut<'a>;
}
