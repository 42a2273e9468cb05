//! telegate — a TCP gateway bridging an embedded device and a controller.
//!
//! The gateway maintains exactly one session to each side: it connects out
//! to the device, accepts a single controller client, and relays
//! newline-delimited JSON messages between them. Device telemetry is
//! decoded, acknowledged, optionally delayed (simulated congestion), and
//! re-encoded toward the controller; controller commands pass through
//! verbatim. Lifecycle and message events stream to a consumer over a
//! bounded channel that the relay never blocks on.
//!
//! # Crate Structure
//!
//! - [`config`] — immutable startup configuration
//! - [`event`] — events emitted toward the dashboard consumer
//! - [`fault`] — simulated-congestion delay policy
//! - [`session`] — the relay engine and its state machine

pub mod config;
pub mod event;
pub mod fault;
pub mod session;

pub use config::{FaultConfig, GatewayConfig};
pub use event::{ControllerStatus, Event, EventSender};
pub use fault::FaultInjector;
pub use session::{Session, SessionError, SessionState};
