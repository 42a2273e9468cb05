use std::fmt;

use telegate_proto::Packet;
use tokio::sync::mpsc;

/// Controller-side connection status as shown to the consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerStatus {
    Waiting,
    Connected,
    Disconnected,
}

impl fmt::Display for ControllerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerStatus::Waiting => write!(f, "waiting"),
            ControllerStatus::Connected => write!(f, "connected"),
            ControllerStatus::Disconnected => write!(f, "disconnected"),
        }
    }
}

/// An event broadcast from the session to the dashboard consumer.
///
/// Produced by the session only; the consumer applies them in arrival
/// order. Connection-state changes are discrete variants so a consumer
/// can reflect state without parsing log text.
#[derive(Debug, Clone)]
pub enum Event {
    /// Human-readable log line.
    Log(String),
    /// Device connection came up (`true`) or went down (`false`).
    DeviceConnection(bool),
    /// Controller-side status transition.
    ControllerConnection(ControllerStatus),
    /// A decoded STATUS snapshot for live telemetry display.
    Status(Packet),
}

/// Non-blocking sender side of the event channel.
///
/// Wraps a bounded `mpsc` sender: the session only ever `try_send`s, so a
/// slow or absent consumer can never stall the relay. Overflowed events
/// are counted and dropped.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::Sender<Event>,
}

impl EventSender {
    /// Create a bounded event channel.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Event>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    /// Emit an event without blocking. Dropped when the buffer is full or
    /// the consumer is gone.
    pub fn emit(&self, event: Event) {
        if let Err(err) = self.tx.try_send(event) {
            tracing::debug!("event dropped: {err}");
        }
    }

    /// Emit a log-line event.
    pub fn log(&self, text: impl Into<String>) {
        self.emit(Event::Log(text.into()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_arrive_in_emission_order() {
        let (tx, mut rx) = EventSender::channel(8);
        tx.emit(Event::DeviceConnection(true));
        tx.emit(Event::ControllerConnection(ControllerStatus::Waiting));
        tx.log("hello");

        assert!(matches!(rx.try_recv().unwrap(), Event::DeviceConnection(true)));
        assert!(matches!(
            rx.try_recv().unwrap(),
            Event::ControllerConnection(ControllerStatus::Waiting)
        ));
        assert!(matches!(rx.try_recv().unwrap(), Event::Log(s) if s == "hello"));
    }

    #[test]
    fn full_buffer_drops_instead_of_blocking() {
        let (tx, mut rx) = EventSender::channel(1);
        tx.log("first");
        tx.log("second"); // dropped, not blocked on

        assert!(matches!(rx.try_recv().unwrap(), Event::Log(s) if s == "first"));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn emit_after_consumer_drop_is_silent() {
        let (tx, rx) = EventSender::channel(1);
        drop(rx);
        tx.log("into the void");
    }

    #[test]
    fn controller_status_display() {
        assert_eq!(ControllerStatus::Waiting.to_string(), "waiting");
        assert_eq!(ControllerStatus::Connected.to_string(), "connected");
        assert_eq!(ControllerStatus::Disconnected.to_string(), "disconnected");
    }
}
