use crate::types::events::Category;
use crate::types::push::Permission;

use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub base_url: String,
    pub categories: Vec<Category>,
    pub page_size: usize,
    pub poll_interval: Duration,
    pub listen: SocketAddr,
    pub vapid_public_key: Option<String>,
    pub push: PushConfig,
}

/// Settings of the provisioned push platform.
#[derive(Debug, Clone)]
pub struct PushConfig {
    /// Subscription handed out by the external push distributor, if any.
    pub subscription: Option<ProvisionedSubscription>,
    pub permission: Permission,
    /// Answer given when the user is asked for permission.
    pub grant_on_request: bool,
}

#[derive(Debug, Clone)]
pub struct ProvisionedSubscription {
    pub endpoint: String,
    pub p256dh: String,
    pub auth: String,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            subscription: None,
            permission: Permission::Default,
            grant_on_request: false,
        }
    }
}
