use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::FaultConfig;

/// Simulated-congestion policy for the device→controller path.
///
/// Rolled once per decoded device message, after the ACK has been written
/// back to the device. A firing roll delays the relay path only — the
/// device's view of acknowledgment latency is never affected. While the
/// delay is pending no further bytes are read from either connection;
/// that backlog is the point of the simulation.
pub struct FaultInjector {
    config: FaultConfig,
    rng: StdRng,
}

impl FaultInjector {
    /// Entropy-seeded injector.
    pub fn new(config: FaultConfig) -> Self {
        Self {
            config,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Deterministic injector for tests.
    pub fn with_seed(config: FaultConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Draw once. Returns the configured delay when the simulation fires.
    pub fn roll(&mut self) -> Option<Duration> {
        if !self.config.enabled {
            return None;
        }
        if self.rng.random::<f64>() < self.config.probability {
            Some(self.config.delay)
        } else {
            None
        }
    }
}
