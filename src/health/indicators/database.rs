//! Relational database probe.

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};

use crate::config::{DatabaseConfig, DATABASE_NAME, DATABASE_POOL_MAX_CONNECTIONS};
use crate::health::entity::HealthStatus;
use crate::health::indicators::HealthIndicator;

/// Probes the database with a trivial round-trip query.
pub struct DatabaseIndicator {
    pool: PgPool,
}

impl DatabaseIndicator {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Build the indicator with a lazy pool: no connection is attempted until
    /// the first probe, so startup succeeds even while the database is down.
    pub fn from_config(config: &DatabaseConfig) -> Self {
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.name);

        let pool = PgPoolOptions::new()
            .max_connections(DATABASE_POOL_MAX_CONNECTIONS)
            .connect_lazy_with(options);

        Self::new(pool)
    }
}

#[async_trait]
impl HealthIndicator for DatabaseIndicator {
    fn name(&self) -> &str {
        DATABASE_NAME
    }

    async fn check(&self) -> HealthStatus {
        match sqlx::query("SELECT 1").execute(&self.pool).await {
            Ok(_) => HealthStatus::up(DATABASE_NAME),
            Err(e) => {
                tracing::debug!(error = %e, "Database probe failed");
                HealthStatus::down_with_error(DATABASE_NAME, e)
            }
        }
    }
}
