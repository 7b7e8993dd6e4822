//! Cache probe.

use async_trait::async_trait;
use redis::{ConnectionAddr, ConnectionInfo, RedisConnectionInfo};

use crate::config::{RedisConfig, REDIS_NAME};
use crate::health::entity::HealthStatus;
use crate::health::indicators::HealthIndicator;

/// Probes the cache with a PING.
///
/// The client handle is optional: when no cache is configured (or the client
/// could not be constructed at startup) the indicator reports down without an
/// error detail instead of failing the whole service.
pub struct RedisIndicator {
    client: Option<redis::Client>,
}

impl RedisIndicator {
    pub fn new(client: Option<redis::Client>) -> Self {
        Self { client }
    }

    pub fn from_config(config: Option<&RedisConfig>) -> Self {
        let client = config.and_then(|config| {
            let info = ConnectionInfo {
                addr: ConnectionAddr::Tcp(config.host.clone(), config.port),
                redis: RedisConnectionInfo {
                    db: config.db,
                    password: config.password.clone(),
                    ..Default::default()
                },
            };

            match redis::Client::open(info) {
                Ok(client) => Some(client),
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to construct Redis client, cache probe will report down");
                    None
                }
            }
        });

        Self::new(client)
    }
}

#[async_trait]
impl HealthIndicator for RedisIndicator {
    fn name(&self) -> &str {
        REDIS_NAME
    }

    async fn check(&self) -> HealthStatus {
        let Some(client) = &self.client else {
            return HealthStatus::down(REDIS_NAME);
        };

        let mut conn = match client.get_multiplexed_async_connection().await {
            Ok(conn) => conn,
            Err(e) => {
                tracing::debug!(error = %e, "Redis connection failed");
                return HealthStatus::down_with_error(REDIS_NAME, e);
            }
        };

        match redis::cmd("PING").query_async::<String>(&mut conn).await {
            Ok(_) => HealthStatus::up(REDIS_NAME),
            Err(e) => {
                tracing::debug!(error = %e, "Redis PING failed");
                HealthStatus::down_with_error(REDIS_NAME, e)
            }
        }
    }
}
