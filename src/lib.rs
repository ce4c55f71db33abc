// src/lib.rs
//
// Telemetry ingestion and command link for a four-floor elevator controller.
//
// Data flows one way for ingestion (bytes -> lines -> records -> history and
// sinks) and one way for egress (command -> encoded bytes -> write). The
// TelemetryPoller is the only piece that touches I/O; an external scheduler
// calls poll() on a short fixed interval and reads the history on a longer one.

#[macro_use]
pub mod logging;

pub mod error;
pub mod history;
pub mod io;
pub mod recorder;
pub mod settings;

pub use error::{LinkError, RejectReason, ValidationError};
pub use history::{HistoryColumns, HistoryEntry, TimeSeriesHistory, HISTORY_CAPACITY};
pub use io::elevator::{
    CommandRequest, DisplayState, ElevatorCodec, MotorState, PollSummary, TelemetryPoller,
    TelemetryRecord, TelemetrySink,
};
pub use io::serial::{
    list_serial_ports, Connection, ConnectionState, LineFramer, LinkOpener, SerialLink,
    SystemSerialOpener,
};
pub use recorder::CsvRecorder;
pub use settings::AppSettings;
