//! Dependency probes.
//!
//! Each indicator performs exactly one proof-of-life operation per
//! invocation. There are no retries and no result caching; every call is a
//! fresh probe with no shared mutable state.

pub mod database;
pub mod redis;
pub mod website;

use async_trait::async_trait;

use crate::health::entity::HealthStatus;

/// A single-dependency probe.
///
/// `check` must never fail: every failure mode of the underlying dependency
/// is converted into a `down` status, with the error captured in the
/// status details where one is available.
#[async_trait]
pub trait HealthIndicator: Send + Sync {
    /// Report key for this dependency.
    fn name(&self) -> &str;

    /// Probe the dependency once and report the verdict.
    async fn check(&self) -> HealthStatus;
}
