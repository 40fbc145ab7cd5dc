use std::process::ExitCode;
use std::sync::Arc;

use clap::{CommandFactory, Parser};
use damson_bridge_lib::config::{BridgeConfig, SessionTimings, DEFAULT_HTTP_PORT};
use damson_bridge_lib::serial::{choose_device, list_ports, PortBackend, SystemPorts};

/// Web control panel for the Damson hexapod.
///
/// Serves a page on localhost whose buttons are relayed as text commands to
/// the robot's controller over serial.
#[derive(Debug, Parser)]
#[command(name = "damson-bridge", version)]
struct Cli {
    /// Serial device of the robot, e.g. COM3 or /dev/ttyUSB0 (auto-detected when omitted)
    port: Option<String>,

    /// Interface the HTTP server binds to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// HTTP port of the control panel
    #[arg(long, default_value_t = DEFAULT_HTTP_PORT)]
    http_port: u16,

    /// Wait after opening the port while the controller resets
    #[arg(long, default_value_t = SessionTimings::default().open_settle_ms)]
    open_settle_ms: u64,

    /// Wait between writing a command and reading the reply
    #[arg(long, default_value_t = SessionTimings::default().command_settle_ms)]
    command_settle_ms: u64,

    /// Read timeout configured on the serial port
    #[arg(long, default_value_t = SessionTimings::default().read_timeout_ms)]
    read_timeout_ms: u64,
}

impl Cli {
    fn into_config(self) -> BridgeConfig {
        BridgeConfig {
            host: self.host,
            http_port: self.http_port,
            device: self.port,
            timings: SessionTimings {
                open_settle_ms: self.open_settle_ms,
                command_settle_ms: self.command_settle_ms,
                read_timeout_ms: self.read_timeout_ms,
            },
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = cli.into_config();
    let backend: Arc<dyn PortBackend> = Arc::new(SystemPorts);

    let ports = list_ports(backend.as_ref());
    damson_bridge_lib::log_available_ports(&ports);

    let Some(device) = choose_device(config.device.as_deref(), &ports) else {
        eprintln!("No serial port available. Please connect the robot.");
        eprintln!("{}", Cli::command().render_usage());
        return ExitCode::FAILURE;
    };
    if config.device.is_none() {
        log::info!("Auto-detected: {}", device);
    }

    match damson_bridge_lib::run(config, backend, &device).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
