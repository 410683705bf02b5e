use std::time::Instant;
use tracing::debug;

/// Logs how long a storage operation took when dropped.
///
/// # Example
///
/// ```ignore
/// async fn load(&self, document_id: &str) -> Result<Option<Document>, StorageError> {
///     let _timer = OperationTimer::new("fs.load");
///     // ... implementation ...
/// }
/// ```
pub struct OperationTimer {
    name: &'static str,
    start: Instant,
}

impl OperationTimer {
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            start: Instant::now(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Drop for OperationTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        debug!(
            operation = %self.name,
            duration_ms = %duration.as_millis(),
            "Storage operation completed"
        );
    }
}

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod metrics_tests;
