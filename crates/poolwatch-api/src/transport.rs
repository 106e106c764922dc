// Shared transport configuration for building reqwest::Client instances.
//
// Keeps timeout and header policy in one place so the client and any
// future probe helpers build identical HTTP stacks.

use std::time::Duration;

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Connect + response timeout for every request.
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, crate::error::Error> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("poolwatch/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(client)
    }
}
