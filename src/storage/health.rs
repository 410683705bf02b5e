use super::StorageKind;
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Common health payload: `{status, storage_type, ...diagnostics}`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub storage_type: StorageKind,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl HealthReport {
    #[must_use]
    pub fn new(status: HealthStatus, storage_type: StorageKind) -> Self {
        Self {
            status,
            storage_type,
            details: Map::new(),
        }
    }

    #[must_use]
    pub fn with_detail(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }

    /// Lower the status; never raises it.
    pub fn downgrade(&mut self, status: HealthStatus) {
        let rank = |s: HealthStatus| match s {
            HealthStatus::Healthy => 0,
            HealthStatus::Degraded => 1,
            HealthStatus::Unhealthy => 2,
        };
        if rank(status) > rank(self.status) {
            self.status = status;
        }
    }

    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_report_serializes_flat() {
        let report = HealthReport::new(HealthStatus::Healthy, StorageKind::KeyValue)
            .with_detail("key_count", 3);
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["status"], json!("healthy"));
        assert_eq!(value["storage_type"], json!("key_value"));
        assert_eq!(value["key_count"], json!(3));
    }

    #[test]
    fn test_downgrade_only_lowers() {
        let mut report = HealthReport::new(HealthStatus::Healthy, StorageKind::Filesystem);
        report.downgrade(HealthStatus::Unhealthy);
        report.downgrade(HealthStatus::Degraded);
        assert_eq!(report.status, HealthStatus::Unhealthy);
        assert!(!report.is_healthy());
    }
}
