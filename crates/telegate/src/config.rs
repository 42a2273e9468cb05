use std::net::SocketAddr;
use std::time::Duration;

use telegate_frame::DEFAULT_MAX_LINE_LEN;

/// Simulated-congestion settings for the device→controller path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaultConfig {
    /// Master switch.
    pub enabled: bool,
    /// Per-message delay probability in `[0, 1]`.
    pub probability: f64,
    /// Delay applied when the draw fires.
    pub delay: Duration,
}

impl Default for FaultConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            probability: 0.2,
            delay: Duration::from_millis(1200),
        }
    }
}

/// Immutable gateway configuration, fixed for the process lifetime.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Address of the device to connect out to.
    pub device_addr: SocketAddr,
    /// Local port the controller connects to.
    pub listen_port: u16,
    /// Bound on the outbound device connect.
    pub connect_timeout: Duration,
    /// Maximum bytes buffered per connection without a line delimiter.
    pub max_line_len: usize,
    /// Capacity of the event channel toward the consumer.
    pub event_capacity: usize,
    /// Simulated congestion.
    pub fault: FaultConfig,
}

impl GatewayConfig {
    /// Build a configuration with defaults for everything but addressing.
    pub fn new(device_addr: SocketAddr, listen_port: u16) -> Self {
        Self {
            device_addr,
            listen_port,
            connect_timeout: Duration::from_secs(5),
            max_line_len: DEFAULT_MAX_LINE_LEN,
            event_capacity: 256,
            fault: FaultConfig::default(),
        }
    }
}
