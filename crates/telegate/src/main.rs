mod logging;

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use telegate::{Event, EventSender, FaultConfig, GatewayConfig, Session, SessionError};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::logging::{init_logging, LogFormat, LogLevel};

// Exit codes aligned with the sysexits-style constants used elsewhere in
// our tooling.
const SUCCESS: i32 = 0;
const FAILURE: i32 = 1;
const TIMEOUT: i32 = 124;

#[derive(Parser, Debug)]
#[command(name = "telegate", version, about = "Device/controller relay gateway")]
struct Cli {
    /// Device address to connect to (host:port).
    #[arg(long, value_name = "ADDR")]
    device: SocketAddr,

    /// Local port the controller connects to.
    #[arg(long, value_name = "PORT", default_value_t = 65432)]
    listen_port: u16,

    /// Device connect timeout in seconds.
    #[arg(long, value_name = "SECS", default_value_t = 5)]
    connect_timeout: u64,

    /// Enable simulated congestion on the controller-bound path.
    #[arg(long)]
    simulate_congestion: bool,

    /// Per-message delay probability when simulating congestion.
    #[arg(long, value_name = "PROB", default_value_t = 0.2)]
    lag_probability: f64,

    /// Simulated delay in milliseconds.
    #[arg(long, value_name = "MS", default_value_t = 1200)]
    lag_delay_ms: u64,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text")]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    log_level: LogLevel,
}

impl Cli {
    fn into_config(self) -> GatewayConfig {
        let mut config = GatewayConfig::new(self.device, self.listen_port);
        config.connect_timeout = Duration::from_secs(self.connect_timeout);
        config.fault = FaultConfig {
            enabled: self.simulate_congestion,
            probability: self.lag_probability.clamp(0.0, 1.0),
            delay: Duration::from_millis(self.lag_delay_ms),
        };
        config
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let config = cli.into_config();
    let (events, rx) = EventSender::channel(config.event_capacity);
    let shutdown = CancellationToken::new();

    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("shutdown requested");
                shutdown.cancel();
            }
        });
    }

    let consumer = tokio::spawn(consume_events(rx));

    let mut session = Session::new(config, events, shutdown);
    let result = session.run().await;

    // Dropping the session releases the event sender so the consumer
    // drains the channel and exits.
    drop(session);
    let _ = consumer.await;
    std::process::exit(exit_code(result));
}

/// Stand-in for the dashboard: renders the event stream to stdout in
/// arrival order. A real consumer would drive telemetry panels from
/// `Status` events instead of printing them.
async fn consume_events(mut rx: mpsc::Receiver<Event>) {
    while let Some(event) = rx.recv().await {
        match event {
            Event::Log(line) => println!("{line}"),
            Event::DeviceConnection(up) => {
                println!("device: {}", if up { "connected" } else { "disconnected" });
            }
            Event::ControllerConnection(status) => println!("controller: {status}"),
            Event::Status(packet) => {
                println!(
                    "telemetry: {}",
                    String::from_utf8_lossy(telegate_proto::encode(&packet).trim_ascii_end())
                );
            }
        }
    }
}

fn exit_code(result: Result<(), SessionError>) -> i32 {
    match result {
        Ok(()) | Err(SessionError::Cancelled) => SUCCESS,
        Err(SessionError::Connect { source, .. })
            if source.kind() == std::io::ErrorKind::TimedOut =>
        {
            TIMEOUT
        }
        Err(err) => {
            let _ = err; // already logged by the session
            FAILURE
        }
    }
}
