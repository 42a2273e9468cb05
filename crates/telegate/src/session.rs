use std::io::{self, ErrorKind};
use std::net::SocketAddr;

use serde_json::Value;
use telegate_frame::{FrameConfig, FrameError, LineFramer};
use telegate_proto::{ack_for, decode, encode, Line, Packet, PacketKind, ProtoError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::GatewayConfig;
use crate::event::{ControllerStatus, Event, EventSender};
use crate::fault::FaultInjector;

const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Errors that end a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The device connection could not be established within the timeout.
    #[error("failed to connect to device at {addr}: {source}")]
    Connect { addr: SocketAddr, source: io::Error },

    /// Listener setup or the one-shot accept failed.
    #[error("failed to accept controller connection: {0}")]
    Accept(io::Error),

    /// Framing failed on an established connection.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// Read/write failure on an established connection.
    #[error("relay I/O error: {0}")]
    Io(#[from] io::Error),

    /// Shutdown was requested via the cancellation token.
    #[error("shutdown requested")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, SessionError>;

/// Lifecycle of one gateway run. Terminal state is `Terminated`; there is
/// no reconnection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingDevice,
    AwaitingController,
    Relaying,
    Terminated,
}

/// The relay engine: one device connection, one controller connection.
///
/// Connects out to the device, accepts exactly one controller, then pumps
/// lines bidirectionally until either side disconnects, an I/O error
/// occurs, or shutdown is requested. Device telemetry is decoded, ACKed,
/// optionally delayed, and re-encoded toward the controller; controller
/// lines pass through verbatim.
pub struct Session {
    config: GatewayConfig,
    events: EventSender,
    shutdown: CancellationToken,
    fault: FaultInjector,
    state: SessionState,
}

impl Session {
    /// Create a session with an entropy-seeded fault injector.
    pub fn new(config: GatewayConfig, events: EventSender, shutdown: CancellationToken) -> Self {
        let fault = FaultInjector::new(config.fault);
        Self::with_fault_injector(config, events, shutdown, fault)
    }

    /// Create a session with an explicit fault injector (seeded in tests).
    pub fn with_fault_injector(
        config: GatewayConfig,
        events: EventSender,
        shutdown: CancellationToken,
        fault: FaultInjector,
    ) -> Self {
        Self {
            config,
            events,
            shutdown,
            fault,
            state: SessionState::AwaitingDevice,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Run the session to completion.
    ///
    /// Returns `Ok(())` on orderly disconnect of either peer. Fatal errors
    /// are emitted as lifecycle events before being returned; the state is
    /// `Terminated` either way.
    pub async fn run(&mut self) -> Result<()> {
        self.events.log("--- telegate gateway ---");

        let addr = self.config.device_addr;
        let device = match tokio::time::timeout(
            self.config.connect_timeout,
            TcpStream::connect(addr),
        )
        .await
        {
            Ok(Ok(stream)) => stream,
            Ok(Err(source)) => return self.fail_connect(addr, source),
            Err(_) => {
                let source = io::Error::new(ErrorKind::TimedOut, "connect timed out");
                return self.fail_connect(addr, source);
            }
        };

        info!(%addr, "device connected");
        self.events.log(format!("connected to device at {addr}"));
        self.events.emit(Event::DeviceConnection(true));
        self.state = SessionState::AwaitingController;

        let result = self.accept_and_relay(device).await;

        // Termination sequence: both sides are reported down no matter how
        // the relay ended; residual framer bytes are discarded with it.
        self.events.emit(Event::DeviceConnection(false));
        self.events
            .emit(Event::ControllerConnection(ControllerStatus::Disconnected));
        self.state = SessionState::Terminated;

        if let Err(ref err) = result {
            warn!("session ended: {err}");
            self.events.log(format!("session ended: {err}"));
        }
        result
    }

    fn fail_connect(&mut self, addr: SocketAddr, source: io::Error) -> Result<()> {
        warn!(%addr, "device connect error: {source}");
        self.events.log(format!("device connect error: {source}"));
        self.events.emit(Event::DeviceConnection(false));
        self.state = SessionState::Terminated;
        Err(SessionError::Connect { addr, source })
    }

    async fn accept_and_relay(&mut self, device: TcpStream) -> Result<()> {
        let port = self.config.listen_port;
        let listener = TcpListener::bind(("0.0.0.0", port))
            .await
            .map_err(SessionError::Accept)?;

        self.events.log(format!("waiting for controller on port {port}"));
        self.events
            .emit(Event::ControllerConnection(ControllerStatus::Waiting));

        // One-shot accept: only the first controller is ever served.
        let (controller, peer) = tokio::select! {
            accepted = listener.accept() => accepted.map_err(SessionError::Accept)?,
            () = self.shutdown.cancelled() => return Err(SessionError::Cancelled),
        };
        drop(listener);

        info!(%peer, "controller connected");
        self.events.log(format!("controller connected from {peer}"));
        self.events
            .emit(Event::ControllerConnection(ControllerStatus::Connected));
        self.state = SessionState::Relaying;

        self.relay(device, controller).await
    }

    async fn relay(&mut self, mut device: TcpStream, mut controller: TcpStream) -> Result<()> {
        let frame_config = FrameConfig {
            max_line_len: self.config.max_line_len,
        };
        let mut device_framer = LineFramer::with_config(frame_config.clone());
        let mut controller_framer = LineFramer::with_config(frame_config);

        let mut device_chunk = [0u8; READ_CHUNK_SIZE];
        let mut controller_chunk = [0u8; READ_CHUNK_SIZE];

        loop {
            tokio::select! {
                read = device.read(&mut device_chunk) => {
                    let n = read?;
                    if n == 0 {
                        self.events.log("device closed the connection");
                        return Ok(());
                    }
                    device_framer.feed(&device_chunk[..n]);
                    self.pump_device_lines(&mut device_framer, &mut device, &mut controller)
                        .await?;
                }
                read = controller.read(&mut controller_chunk) => {
                    let n = read?;
                    if n == 0 {
                        self.events.log("controller closed the connection");
                        return Ok(());
                    }
                    controller_framer.feed(&controller_chunk[..n]);
                    self.pump_controller_lines(&mut controller_framer, &mut device).await?;
                }
                () = self.shutdown.cancelled() => return Err(SessionError::Cancelled),
            }
        }
    }

    /// Forward controller lines to the device verbatim. No parsing, no ACK.
    async fn pump_controller_lines(
        &mut self,
        framer: &mut LineFramer,
        device: &mut TcpStream,
    ) -> Result<()> {
        while let Some(line) = framer.next_line()? {
            if line.is_empty() {
                continue;
            }
            device.write_all(&line).await?;
            device.write_all(b"\n").await?;
            self.events
                .log(format!("TX CMD->DEV: {}", String::from_utf8_lossy(&line)));
        }
        Ok(())
    }

    /// Decode, acknowledge, and relay device lines toward the controller.
    async fn pump_device_lines(
        &mut self,
        framer: &mut LineFramer,
        device: &mut TcpStream,
        controller: &mut TcpStream,
    ) -> Result<()> {
        while let Some(line) = framer.next_line()? {
            if line.is_empty() {
                continue;
            }

            let packet = match decode(&line) {
                Ok(Line::Hello) => {
                    self.events.log("device says HELLO");
                    continue;
                }
                Err(ProtoError::NonJson(text)) => {
                    debug!("dropping non-JSON device line");
                    self.events.log(format!("RX (non-JSON): {text}"));
                    continue;
                }
                Ok(Line::Packet(packet)) => packet,
            };

            // ACK first: the device is unblocked before any simulated lag
            // is applied to the controller-bound path.
            if let Some(ack) = ack_for(&packet) {
                device.write_all(&encode(&ack)).await?;
            }

            if let Some(delay) = self.fault.roll() {
                self.events.log("*** simulating lag (after ACK) ***");
                tokio::time::sleep(delay).await;
            }

            controller.write_all(&encode(&packet)).await?;
            self.note_relayed(packet);
        }
        Ok(())
    }

    fn note_relayed(&mut self, packet: Packet) {
        match packet.kind() {
            PacketKind::Status => {
                self.events.log(format!(
                    "RX STATUS seq={} state={}",
                    display_field(&packet, "seq"),
                    display_field(&packet, "state"),
                ));
                self.events.emit(Event::Status(packet));
            }
            PacketKind::Fault => {
                self.events
                    .log(format!("RX FAULT code={}", display_field(&packet, "code")));
            }
            PacketKind::Ack | PacketKind::Other => {}
        }
    }
}

fn display_field(packet: &Packet, name: &str) -> String {
    match packet.field(name) {
        Some(Value::String(s)) => s.clone(),
        Some(value) => value.to_string(),
        None => "-".to_string(),
    }
}
