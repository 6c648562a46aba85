//! Node configuration

use std::time::Duration;

/// Default port the overlay listens on.
pub const DEFAULT_PORT: u16 = 3103;

/// Default interval between health-check sweeps.
pub const DEFAULT_HEALTHCHECK_INTERVAL: Duration = Duration::from_millis(60_000);

/// Default per-request timeout for peer transport calls.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(1_000);

/// LANPUB node configuration
#[derive(Clone, Debug)]
pub struct NodeConfig {
    /// Port peers are contacted on (and the host listener binds to)
    pub port: u16,
    /// Interval between health-check sweeps
    pub healthcheck_interval: Duration,
    /// Per-request transport timeout
    pub request_timeout: Duration,
    /// Maximum in-flight requests during sweeps (health check, subnet join)
    pub sweep_concurrency: usize,
}

impl Default for NodeConfig {
    fn default() -> Self {
        NodeConfig {
            port: DEFAULT_PORT,
            healthcheck_interval: DEFAULT_HEALTHCHECK_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            sweep_concurrency: 16,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = NodeConfig::default();
        assert_eq!(config.port, 3103);
        assert_eq!(config.healthcheck_interval, Duration::from_secs(60));
        assert_eq!(config.request_timeout, Duration::from_millis(1000));
        assert!(config.sweep_concurrency > 0);
    }
}
