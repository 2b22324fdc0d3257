// file: src/utils/telemetry.rs
// description: service health reporting and operation timing
// reference: GET /health contract of the embedding service

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tracing::info;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    fn icon(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "✓",
            HealthStatus::Degraded => "⚠",
            HealthStatus::Unhealthy => "✗",
        }
    }
}

/// Outcome of probing one service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthCheck {
    pub component: String,
    pub endpoint: String,
    pub status: HealthStatus,
    pub message: Option<String>,
    pub response_time_ms: u64,
}

impl HealthCheck {
    fn with_status(
        component: &str,
        endpoint: &str,
        status: HealthStatus,
        message: Option<String>,
        response_time: Duration,
    ) -> Self {
        Self {
            component: component.to_string(),
            endpoint: endpoint.to_string(),
            status,
            message,
            response_time_ms: response_time.as_millis() as u64,
        }
    }

    pub fn healthy(component: &str, endpoint: &str, response_time: Duration) -> Self {
        Self::with_status(component, endpoint, HealthStatus::Healthy, None, response_time)
    }

    pub fn degraded(
        component: &str,
        endpoint: &str,
        message: String,
        response_time: Duration,
    ) -> Self {
        Self::with_status(
            component,
            endpoint,
            HealthStatus::Degraded,
            Some(message),
            response_time,
        )
    }

    pub fn unhealthy(
        component: &str,
        endpoint: &str,
        message: String,
        response_time: Duration,
    ) -> Self {
        Self::with_status(
            component,
            endpoint,
            HealthStatus::Unhealthy,
            Some(message),
            response_time,
        )
    }
}

/// A service check stamped with the time and client version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub check: HealthCheck,
    pub timestamp: u64,
    pub version: String,
}

impl HealthReport {
    pub fn new(check: HealthCheck, version: &str) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::from_secs(0))
            .as_secs();

        Self {
            check,
            timestamp,
            version: version.to_string(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.check.status == HealthStatus::Healthy
    }

    pub fn format(&self) -> String {
        let check = &self.check;
        let mut output = format!(
            "{} {} at {} ({:?}) - {}ms\nVersion: {}\nChecked: {}\n",
            check.status.icon(),
            check.component,
            check.endpoint,
            check.status,
            check.response_time_ms,
            self.version,
            chrono::DateTime::from_timestamp(self.timestamp as i64, 0)
                .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                .unwrap_or_else(|| "unknown".to_string())
        );

        if let Some(ref msg) = check.message {
            output.push_str(&format!("  {}\n", msg));
        }

        output
    }
}

/// Logs how long an operation took.
pub struct OperationTimer {
    operation: String,
    start: Instant,
}

impl OperationTimer {
    pub fn new(operation: &str) -> Self {
        info!("Starting: {}", operation);
        Self {
            operation: operation.to_string(),
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn finish_with_count(self, count: usize) -> Duration {
        let elapsed = self.elapsed();
        info!(
            "Finished: {} - {} items in {:.2}s",
            self.operation,
            count,
            elapsed.as_secs_f64()
        );
        elapsed
    }
}
