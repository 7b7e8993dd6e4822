//! Health status value object.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

/// Up/down verdict for a single dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Up,
    Down,
}

/// Immutable result of one dependency probe.
///
/// Created fresh on every check via [`HealthStatus::up`] / [`HealthStatus::down`];
/// the timestamp is captured at construction and never changes. The name is
/// not serialized inline — the aggregator uses it as the report key.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    #[serde(skip)]
    name: String,
    status: Status,
    timestamp: String,
    details: Map<String, Value>,
}

impl HealthStatus {
    fn new(name: impl Into<String>, status: Status, details: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            status,
            // UTC, ISO-8601, millisecond precision
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            details,
        }
    }

    /// A healthy verdict with no diagnostic payload.
    pub fn up(name: impl Into<String>) -> Self {
        Self::new(name, Status::Up, Map::new())
    }

    /// An unhealthy verdict with no diagnostic payload.
    pub fn down(name: impl Into<String>) -> Self {
        Self::new(name, Status::Down, Map::new())
    }

    /// An unhealthy verdict carrying the captured error under `details.error`.
    pub fn down_with_error(name: impl Into<String>, error: impl std::fmt::Display) -> Self {
        let mut details = Map::new();
        details.insert("error".to_string(), Value::String(error.to_string()));
        Self::new(name, Status::Down, details)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_up(&self) -> bool {
        self.status == Status::Up
    }

    pub fn details(&self) -> &Map<String, Value> {
        &self.details
    }
}
