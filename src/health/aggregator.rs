//! Health check fan-out and aggregation.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::health::entity::{HealthStatus, Status};
use crate::health::indicators::HealthIndicator;

/// Merged result of one aggregation run.
///
/// `status` is up iff every constituent check is up. The per-dependency
/// entries are flattened into the top level of the JSON body, keyed by
/// dependency name.
#[derive(Debug, Serialize)]
pub struct AggregateHealth {
    pub status: Status,
    #[serde(flatten)]
    pub checks: BTreeMap<String, HealthStatus>,
}

/// Failure of the check-running machinery itself.
///
/// An individual dependency being down is data, not an error; this error is
/// reserved for a probe task that panicked or was cancelled before settling.
#[derive(Debug, thiserror::Error)]
#[error("Health check task failed to complete: {0}")]
pub struct AggregationError(#[from] tokio::task::JoinError);

/// Fans out to all registered indicators and merges their verdicts.
///
/// Indicators are injected at construction; the aggregator holds no other
/// state and every run is independent.
pub struct HealthAggregator {
    indicators: Vec<Arc<dyn HealthIndicator>>,
}

impl HealthAggregator {
    pub fn new(indicators: Vec<Arc<dyn HealthIndicator>>) -> Self {
        Self { indicators }
    }

    /// Run every indicator concurrently and wait for all to settle.
    ///
    /// Probes run as separate tasks; a task that fails to complete surfaces
    /// as [`AggregationError`] rather than a partial report. Once spawned,
    /// probes run to completion or natural timeout — there is no cancellation.
    pub async fn get_health(&self) -> Result<AggregateHealth, AggregationError> {
        let tasks: Vec<_> = self
            .indicators
            .iter()
            .cloned()
            .map(|indicator| tokio::spawn(async move { indicator.check().await }))
            .collect();

        let settled = futures::future::join_all(tasks).await;

        let mut checks = BTreeMap::new();
        for result in settled {
            let status = result?;
            checks.insert(status.name().to_string(), status);
        }

        let status = if checks.values().all(HealthStatus::is_up) {
            Status::Up
        } else {
            Status::Down
        };

        Ok(AggregateHealth { status, checks })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Stub indicator with a fixed verdict.
    struct StaticIndicator {
        name: &'static str,
        up: bool,
    }

    impl StaticIndicator {
        fn up(name: &'static str) -> Arc<dyn HealthIndicator> {
            Arc::new(Self { name, up: true })
        }

        fn down(name: &'static str) -> Arc<dyn HealthIndicator> {
            Arc::new(Self { name, up: false })
        }
    }

    #[async_trait]
    impl HealthIndicator for StaticIndicator {
        fn name(&self) -> &str {
            self.name
        }

        async fn check(&self) -> HealthStatus {
            if self.up {
                HealthStatus::up(self.name)
            } else {
                HealthStatus::down_with_error(self.name, "probe failed")
            }
        }
    }

    /// Stub whose probe task panics, simulating a mechanism-level failure.
    struct PanickingIndicator;

    #[async_trait]
    impl HealthIndicator for PanickingIndicator {
        fn name(&self) -> &str {
            "broken"
        }

        async fn check(&self) -> HealthStatus {
            panic!("simulated check-runner failure");
        }
    }

    fn names(report: &AggregateHealth) -> Vec<&str> {
        report.checks.keys().map(String::as_str).collect()
    }

    #[tokio::test]
    async fn test_all_up_yields_overall_up() {
        let aggregator = HealthAggregator::new(vec![
            StaticIndicator::up("database"),
            StaticIndicator::up("redis"),
            StaticIndicator::up("website"),
        ]);

        let report = aggregator.get_health().await.unwrap();
        assert_eq!(report.status, Status::Up);
        assert_eq!(names(&report), vec!["database", "redis", "website"]);
        assert!(report.checks.values().all(HealthStatus::is_up));
    }

    #[tokio::test]
    async fn test_single_down_flips_overall_without_affecting_others() {
        let aggregator = HealthAggregator::new(vec![
            StaticIndicator::up("database"),
            StaticIndicator::down("redis"),
            StaticIndicator::up("website"),
        ]);

        let report = aggregator.get_health().await.unwrap();
        assert_eq!(report.status, Status::Down);
        assert!(report.checks["database"].is_up());
        assert!(!report.checks["redis"].is_up());
        assert!(report.checks["website"].is_up());
    }

    #[tokio::test]
    async fn test_panicking_probe_surfaces_as_aggregation_error() {
        let aggregator = HealthAggregator::new(vec![
            StaticIndicator::up("database"),
            Arc::new(PanickingIndicator),
        ]);

        let err = aggregator.get_health().await.unwrap_err();
        assert!(err.to_string().contains("failed to complete"));
    }

    #[tokio::test]
    async fn test_repeated_runs_are_idempotent() {
        let aggregator = HealthAggregator::new(vec![
            StaticIndicator::up("database"),
            StaticIndicator::down("redis"),
        ]);

        let first = aggregator.get_health().await.unwrap();
        let second = aggregator.get_health().await.unwrap();

        assert_eq!(first.status, second.status);
        for (name, check) in &first.checks {
            assert_eq!(check.status(), second.checks[name].status());
        }
    }

    #[tokio::test]
    async fn test_report_serializes_flattened_by_name() {
        let aggregator = HealthAggregator::new(vec![
            StaticIndicator::up("database"),
            StaticIndicator::down("redis"),
        ]);

        let report = aggregator.get_health().await.unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["status"], "down");
        assert_eq!(json["database"]["status"], "up");
        assert_eq!(json["redis"]["status"], "down");
        assert_eq!(json["redis"]["details"]["error"], "probe failed");
    }

    #[tokio::test]
    async fn test_empty_indicator_set_is_up() {
        let aggregator = HealthAggregator::new(Vec::new());

        let report = aggregator.get_health().await.unwrap();
        assert_eq!(report.status, Status::Up);
        assert!(report.checks.is_empty());
    }
}
