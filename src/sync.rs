mod channel;
mod controller;

pub use channel::{LiveChannel, spawn_polling_feed};
pub use controller::{CategoryHandle, SyncController, SyncStatus};

#[cfg(test)]
pub(crate) use channel::tests as test_support;
