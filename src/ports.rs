pub mod events;
pub mod push;
pub mod time;

pub use events::EventSource;
pub use push::{NotificationPermissions, PushPlatform, SubscriptionRegistrar};
pub use time::TimeProvider;
