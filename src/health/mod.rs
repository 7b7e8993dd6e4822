//! Dependency health checking.
//!
//! An [`indicators::HealthIndicator`] probes exactly one dependency and
//! reports an up/down [`entity::HealthStatus`]; the
//! [`aggregator::HealthAggregator`] fans out to all indicators concurrently
//! and merges their verdicts into one report.

pub mod aggregator;
pub mod entity;
pub mod indicators;
