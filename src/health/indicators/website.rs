//! External website probe.

use std::time::Duration;

use async_trait::async_trait;

use crate::config::{WebsiteConfig, WEBSITE_TIMEOUT_MS};
use crate::health::entity::HealthStatus;
use crate::health::indicators::HealthIndicator;

/// Probes an external site with a bounded-timeout GET.
///
/// A 2xx response is up. Any other status is down without an error detail
/// (the site answered, just not healthily); a transport failure or timeout
/// is down with the error captured.
pub struct WebsiteIndicator {
    name: String,
    url: String,
    client: reqwest::Client,
}

impl WebsiteIndicator {
    pub fn new(config: &WebsiteConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(WEBSITE_TIMEOUT_MS))
            .build()?;

        Ok(Self {
            name: config.name.clone(),
            url: config.url.clone(),
            client,
        })
    }
}

#[async_trait]
impl HealthIndicator for WebsiteIndicator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn check(&self) -> HealthStatus {
        match self.client.get(&self.url).send().await {
            // is_success covers exactly [200, 300)
            Ok(response) if response.status().is_success() => HealthStatus::up(&self.name),
            Ok(response) => {
                tracing::debug!(status = response.status().as_u16(), url = %self.url, "Website probe got non-2xx response");
                HealthStatus::down(&self.name)
            }
            Err(e) => {
                tracing::debug!(error = %e, url = %self.url, "Website probe failed");
                HealthStatus::down_with_error(&self.name, e)
            }
        }
    }
}
