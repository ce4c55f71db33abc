// tools/elevator_cli/main.rs
//
// Terminal driver for the elevator link.
//
// Usage:
//   elevator_cli ports [--prefix COM]
//   elevator_cli monitor [--port /dev/ttyUSB0] [--csv [PATH]] [--history-out FILE] [--duration SECS]
//   elevator_cli send [--port /dev/ttyUSB0] ORIGIN DESTINATION

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tokio::time::{interval, MissedTickBehavior};

use elevator_link::settings::{load_settings, settings_path, AppSettings};
use elevator_link::{
    list_serial_ports, logging, tlog, CommandRequest, CsvRecorder, SystemSerialOpener,
    TelemetryPoller,
};

#[derive(Parser)]
#[command(
    name = "elevator_cli",
    version,
    about = "Monitor and command a four-floor elevator controller over serial"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Settings file (default: <config dir>/elevator-link/settings.json)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Mirror log output to a timestamped file in this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// List serial ports
    Ports(PortsArgs),
    /// Stream telemetry and print the latest values
    Monitor(MonitorArgs),
    /// Send a single floor request
    Send(SendArgs),
}

#[derive(Args)]
struct PortsArgs {
    /// Only show ports whose name starts with this prefix
    #[arg(long)]
    prefix: Option<String>,
}

#[derive(Args)]
struct MonitorArgs {
    /// Serial port (falls back to default_port from settings)
    #[arg(long)]
    port: Option<String>,

    /// Record accepted telemetry to CSV; without PATH a timestamped file is created in csv_dir
    #[arg(long, num_args = 0..=1, value_name = "PATH")]
    csv: Option<Option<PathBuf>>,

    /// Write the retained history as JSON on exit
    #[arg(long, value_name = "FILE")]
    history_out: Option<PathBuf>,

    /// Stop after this many seconds
    #[arg(long, value_name = "SECS")]
    duration: Option<u64>,
}

#[derive(Args)]
struct SendArgs {
    /// Serial port (falls back to default_port from settings)
    #[arg(long)]
    port: Option<String>,

    /// Floor the car is called from (0-3)
    #[arg(allow_negative_numbers = true)]
    origin: i32,

    /// Floor to travel to (0-3)
    #[arg(allow_negative_numbers = true)]
    destination: i32,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(dir) = &cli.log_dir {
        if let Err(e) = logging::init_file_logging(dir) {
            eprintln!("{}", e);
        }
    }

    let result = run(cli);
    logging::stop_file_logging();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tlog!("[cli] {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let path = match cli.settings {
        Some(path) => path,
        None => settings_path()?,
    };
    let settings = load_settings(&path)?;

    match cli.command {
        Command::Ports(args) => cmd_ports(&settings, args),
        Command::Monitor(args) => cmd_monitor(&settings, args),
        Command::Send(args) => cmd_send(&settings, args),
    }
}

fn resolve_port(arg: Option<String>, settings: &AppSettings) -> Result<String, String> {
    arg.or_else(|| settings.default_port.clone())
        .ok_or_else(|| "No port given and no default_port in settings".to_string())
}

fn new_poller(settings: &AppSettings) -> TelemetryPoller {
    let opener = SystemSerialOpener::new();
    TelemetryPoller::new(Box::new(opener)).with_max_line_length(settings.max_line_length)
}

// ============================================================================
// ports
// ============================================================================

fn cmd_ports(settings: &AppSettings, args: PortsArgs) -> Result<(), String> {
    let prefix = args.prefix.or_else(|| settings.port_prefix.clone());
    let ports = list_serial_ports(prefix.as_deref())?;

    if ports.is_empty() {
        println!("No serial ports found");
        return Ok(());
    }

    for port in ports {
        let usb_id = match (port.vid, port.pid) {
            (Some(vid), Some(pid)) => format!(" [{:04x}:{:04x}]", vid, pid),
            _ => String::new(),
        };
        let product = port
            .product
            .or(port.manufacturer)
            .map(|p| format!(" {}", p))
            .unwrap_or_default();
        println!("{}\t{}{}{}", port.port_name, port.port_type, usb_id, product);
    }
    Ok(())
}

// ============================================================================
// monitor
// ============================================================================

fn cmd_monitor(settings: &AppSettings, args: MonitorArgs) -> Result<(), String> {
    let port = resolve_port(args.port.clone(), settings)?;
    let mut poller = new_poller(settings);

    match &args.csv {
        Some(Some(path)) => poller.add_sink(Box::new(CsvRecorder::create(path)?)),
        Some(None) => poller.add_sink(Box::new(CsvRecorder::create_in(Path::new(
            &settings.csv_dir,
        ))?)),
        None => {}
    }

    poller.connect(&port).map_err(|e| e.to_string())?;
    tlog!("[cli] {}", poller.status());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .enable_io()
        .build()
        .map_err(|e| format!("Failed to start runtime: {}", e))?;
    let outcome = runtime.block_on(monitor_loop(&mut poller, settings, args.duration));

    poller.disconnect();

    if let Some(path) = &args.history_out {
        write_history(&poller, path)?;
    }

    outcome
}

/// Runs until interrupted or the link drops.
/// Both ticks share one task so an ingestion cycle never overlaps a refresh.
async fn monitor_loop(
    poller: &mut TelemetryPoller,
    settings: &AppSettings,
    duration: Option<u64>,
) -> Result<(), String> {
    let mut poll_tick = interval(Duration::from_millis(settings.poll_interval_ms.max(1)));
    poll_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut refresh_tick = interval(Duration::from_millis(settings.refresh_interval_ms.max(1)));
    refresh_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let deadline = async {
        match duration {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::pin!(deadline);

    let mut last_status = poller.status().to_string();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tlog!("[cli] Interrupted");
                return Ok(());
            }
            _ = &mut deadline => {
                tlog!("[cli] Duration elapsed");
                return Ok(());
            }
            _ = poll_tick.tick() => {
                if let Err(e) = poller.poll() {
                    return Err(e.to_string());
                }
            }
            _ = refresh_tick.tick() => {
                println!("{}", poller.display());
                if poller.status() != last_status {
                    last_status = poller.status().to_string();
                    println!("  {}", last_status);
                }
            }
        }
    }
}

fn write_history(poller: &TelemetryPoller, path: &Path) -> Result<(), String> {
    let content = serde_json::to_string_pretty(&poller.snapshot())
        .map_err(|e| format!("Failed to serialize history: {}", e))?;
    std::fs::write(path, content).map_err(|e| format!("Failed to write history: {}", e))?;
    tlog!(
        "[cli] Wrote {} history entries to {}",
        poller.history().len(),
        path.display()
    );
    Ok(())
}

// ============================================================================
// send
// ============================================================================

fn cmd_send(settings: &AppSettings, args: SendArgs) -> Result<(), String> {
    let port = resolve_port(args.port, settings)?;
    let mut poller = new_poller(settings);

    poller.connect(&port).map_err(|e| e.to_string())?;
    let result = poller.send_command(CommandRequest::new(args.origin, args.destination));
    println!("{}", poller.status());
    poller.disconnect();

    result.map_err(|e| e.to_string())
}
