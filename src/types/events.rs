use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

const UNKNOWN_COUNTRY: &str = "unknown";

/// Category tag of a disaster feed, e.g. `earthquake`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the live-channel event carrying new batches for this category.
    pub fn live_event_name(&self) -> String {
        format!("new-{}", self.0)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Backend ids arrive either as JSON numbers or strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventId {
    Number(i64),
    Text(String),
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventId::Number(id) => write!(f, "{id}"),
            EventId::Text(id) => f.write_str(id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Severity {
    Level(f64),
    Label(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisasterEvent {
    pub id: EventId,
    #[serde(rename = "type")]
    pub kind: String,
    pub location: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub magnitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    /// Fields the backend sends that this client does not interpret.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl DisasterEvent {
    /// The country for display, or `None` when the backend reported the unknown sentinel.
    pub fn country_label(&self) -> Option<&str> {
        let country = self.country.trim();
        if country.is_empty() || country.eq_ignore_ascii_case(UNKNOWN_COUNTRY) {
            None
        } else {
            Some(country)
        }
    }
}

#[cfg(test)]
pub(crate) fn event(id: i64, location: &str) -> DisasterEvent {
    DisasterEvent {
        id: EventId::Number(id),
        kind: "earthquake".to_string(),
        location: location.to_string(),
        country: "Unknown".to_string(),
        magnitude: Some(4.2),
        severity: None,
        extra: BTreeMap::new(),
    }
}
