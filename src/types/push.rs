use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Delivery descriptor issued by the push platform: `{ endpoint, keys: { p256dh, auth } }`.
pub type PushSubscriptionRecord = web_push::SubscriptionInfo;

/// Notification permission as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Default,
    Granted,
    Denied,
}

impl FromStr for Permission {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(Permission::Default),
            "granted" => Ok(Permission::Granted),
            "denied" => Ok(Permission::Denied),
            other => Err(format!(
                "invalid permission '{other}'; expected default, granted or denied"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriberState {
    Unsupported,
    Default,
    Requesting,
    Granted,
    Denied,
    Failed,
}

impl SubscriberState {
    /// Whether a user-triggered enable may start from this state.
    pub fn can_enable(self) -> bool {
        matches!(self, SubscriberState::Default | SubscriberState::Failed)
    }
}

impl From<Permission> for SubscriberState {
    fn from(permission: Permission) -> Self {
        match permission {
            Permission::Default => SubscriberState::Default,
            Permission::Granted => SubscriberState::Granted,
            Permission::Denied => SubscriberState::Denied,
        }
    }
}

impl fmt::Display for SubscriberState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SubscriberState::Unsupported => "unsupported",
            SubscriberState::Default => "default",
            SubscriberState::Requesting => "requesting",
            SubscriberState::Granted => "granted",
            SubscriberState::Denied => "denied",
            SubscriberState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Subscriber state plus the message of the last reported failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriberStatus {
    pub state: SubscriberState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SubscriberStatus {
    pub fn new(state: SubscriberState) -> Self {
        Self {
            state,
            message: None,
        }
    }

    pub fn with_message(state: SubscriberState, message: impl Into<String>) -> Self {
        Self {
            state,
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscribeOptions {
    pub user_visible_only: bool,
    /// Decoded application server (VAPID) public key.
    pub application_server_key: Vec<u8>,
}
