//! DTOs for health check endpoint.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Healthy,
    Degraded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckState {
    Ok,
    Error,
}

/// Result of probing the URL store.
#[derive(Debug, Serialize)]
pub struct StorageCheck {
    pub status: CheckState,
    pub message: String,
    /// Number of stored links, when the store answered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<u64>,
}

impl StorageCheck {
    pub fn ok(links: u64) -> Self {
        Self {
            status: CheckState::Ok,
            message: format!("{links} links stored"),
            links: Some(links),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: CheckState::Error,
            message: message.into(),
            links: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthChecks {
    pub storage: StorageCheck,
}

/// `GET /health` body.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: ServiceStatus,
    pub version: &'static str,
    pub checks: HealthChecks,
}

impl HealthResponse {
    /// Derives the overall status from the individual checks.
    pub fn from_checks(checks: HealthChecks) -> Self {
        let status = if checks.storage.status == CheckState::Ok {
            ServiceStatus::Healthy
        } else {
            ServiceStatus::Degraded
        };

        Self {
            status,
            version: env!("CARGO_PKG_VERSION"),
            checks,
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == ServiceStatus::Healthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_degraded_when_storage_fails() {
        let response = HealthResponse::from_checks(HealthChecks {
            storage: StorageCheck::failed("Storage error: locked"),
        });

        assert!(!response.is_healthy());
        let body = serde_json::to_value(&response).unwrap();
        assert_eq!(body["status"], "degraded");
        assert_eq!(
            body["checks"]["storage"],
            json!({ "status": "error", "message": "Storage error: locked" })
        );
    }

    #[test]
    fn test_healthy_reports_link_count() {
        let response = HealthResponse::from_checks(HealthChecks {
            storage: StorageCheck::ok(3),
        });

        let body = serde_json::to_value(&response).unwrap();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["checks"]["storage"]["links"], 3);
    }
}
