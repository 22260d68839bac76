//! Health report returned by `GET /health`.

use serde::Serialize;
use std::collections::BTreeMap;

/// Overall service state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Health {
    Healthy,
    Degraded,
}

/// Outcome of a single component check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckState {
    Ok,
    Error,
}

#[derive(Debug, Serialize)]
pub struct ComponentCheck {
    pub status: CheckState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ComponentCheck {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: CheckState::Ok,
            message: Some(message.into()),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: CheckState::Error,
            message: Some(message.into()),
        }
    }
}

/// Component checks keyed by component name, plus the derived overall state.
///
/// The service is degraded as soon as one component reports an error.
#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: Health,
    pub version: &'static str,
    pub checks: BTreeMap<&'static str, ComponentCheck>,
}

impl HealthReport {
    pub fn new(checks: impl IntoIterator<Item = (&'static str, ComponentCheck)>) -> Self {
        let checks: BTreeMap<_, _> = checks.into_iter().collect();
        let status = if checks.values().all(|c| c.status == CheckState::Ok) {
            Health::Healthy
        } else {
            Health::Degraded
        };

        Self {
            status,
            version: env!("CARGO_PKG_VERSION"),
            checks,
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == Health::Healthy
    }
}
