// src/io/elevator/poller.rs
//
// Ingestion cycle and command egress for the elevator controller.
//
// One call to poll() drains whatever bytes the link has right now, frames them
// into lines, decodes each line, and for every accepted record updates the
// display, appends to the history and notifies the sinks. The caller invokes
// poll() on a fixed short interval; nothing here blocks or keeps a timer.

use std::io;

use crate::error::{LinkError, RejectReason};
use crate::history::{HistoryEntry, TimeSeriesHistory};
use crate::io::codec::LineCodec;
use crate::io::now_us;
use crate::io::serial::{Connection, LineFramer, LinkOpener, SerialLink, BAUD_RATE};

use super::codec::{CommandRequest, ElevatorCodec, TelemetryRecord};
use super::display::DisplayState;

/// Bytes requested from the link per read() call
const READ_CHUNK: usize = 256;

const STATUS_DISCONNECTED: &str = "Disconnected";

/// Receives the outcome of every framed line.
pub trait TelemetrySink: Send {
    /// Called once per accepted record, with the ingestion timestamp.
    fn on_record(&mut self, timestamp_us: u64, record: &TelemetryRecord);

    /// Called once per rejected line with the framed bytes exactly as received
    /// (terminator excluded).
    fn on_rejected(&mut self, _line: &[u8], _reason: &RejectReason) {}
}

/// Counters for one ingestion cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollSummary {
    pub bytes_read: usize,
    pub records: usize,
    pub rejected: usize,
}

pub struct TelemetryPoller {
    connection: Connection,
    framer: LineFramer,
    history: TimeSeriesHistory,
    display: DisplayState,
    sinks: Vec<Box<dyn TelemetrySink>>,
    status: String,
    read_buf: [u8; READ_CHUNK],
}

impl TelemetryPoller {
    pub fn new(opener: Box<dyn LinkOpener>) -> Self {
        Self {
            connection: Connection::new(opener),
            framer: LineFramer::new(),
            history: TimeSeriesHistory::new(),
            display: DisplayState::default(),
            sinks: Vec::new(),
            status: STATUS_DISCONNECTED.to_string(),
            read_buf: [0u8; READ_CHUNK],
        }
    }

    /// Replace the framer with one that caps lines at `max_line_length` bytes.
    pub fn with_max_line_length(mut self, max_line_length: usize) -> Self {
        self.framer = LineFramer::with_max_line_length(max_line_length);
        self
    }

    pub fn add_sink(&mut self, sink: Box<dyn TelemetrySink>) {
        self.sinks.push(sink);
    }

    // ========================================================================
    // Connection
    // ========================================================================

    pub fn connect(&mut self, port: &str) -> Result<(), LinkError> {
        match self.connection.connect(port) {
            Ok(()) => {
                // Leftovers from a previous link are not part of this stream
                self.framer.clear();
                self.status = format!("Connected to {} @ {}", port, BAUD_RATE);
                Ok(())
            }
            Err(e) => {
                self.status = e.to_string();
                Err(e)
            }
        }
    }

    /// Safe at any time. Buffered partial data and history are left as they are.
    pub fn disconnect(&mut self) {
        self.connection.disconnect();
        self.status = STATUS_DISCONNECTED.to_string();
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }

    pub fn port(&self) -> Option<&str> {
        self.connection.port()
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    // ========================================================================
    // Ingestion
    // ========================================================================

    /// Run one ingestion cycle. A no-op while disconnected.
    ///
    /// Lines that arrived before a read error are still processed; the error
    /// then drops the link and is returned as `LinkLost`.
    pub fn poll(&mut self) -> Result<PollSummary, LinkError> {
        let mut summary = PollSummary::default();
        let Some(link) = self.connection.link_mut() else {
            return Ok(summary);
        };

        let mut incoming = Vec::new();
        let read_error = drain_available(link, &mut self.read_buf, &mut incoming).err();
        summary.bytes_read = incoming.len();

        let lines: Vec<Vec<u8>> = self.framer.feed(&incoming).collect();
        for line in &lines {
            self.process_line(line, &mut summary);
        }

        if let Some(error) = read_error {
            if let Some(lost) = self.connection.on_io_failure(error) {
                self.status = format!("Serial error: {}", lost);
                return Err(lost);
            }
        }

        Ok(summary)
    }

    fn process_line(&mut self, line: &[u8], summary: &mut PollSummary) {
        match ElevatorCodec::decode(line) {
            Ok(record) => {
                let timestamp_us = now_us();
                self.display.update(&record);
                self.history.append(
                    timestamp_us,
                    record.position(),
                    record.velocity(),
                    record.temperature(),
                );
                for sink in &mut self.sinks {
                    sink.on_record(timestamp_us, &record);
                }
                summary.records += 1;
            }
            Err(reason) => {
                // Bare terminators are line noise, not worth a status change
                if reason != RejectReason::EmptyLine {
                    tlog!("[poller] {} (raw: {})", reason, hex::encode(line));
                    self.status = reason.to_string();
                }
                for sink in &mut self.sinks {
                    sink.on_rejected(line, &reason);
                }
                summary.rejected += 1;
            }
        }
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Encode and write a command. Fails without I/O when disconnected or invalid;
    /// a write error drops the link.
    pub fn send_command(&mut self, request: CommandRequest) -> Result<(), LinkError> {
        if !self.connection.is_connected() {
            self.status = LinkError::NotConnected.to_string();
            return Err(LinkError::NotConnected);
        }

        let frame = match ElevatorCodec::encode(&request) {
            Ok(frame) => frame,
            Err(e) => {
                self.status = format!("Invalid command: {}", e);
                return Err(e.into());
            }
        };

        let result = match self.connection.link_mut() {
            Some(link) => link.write_all(&frame),
            None => return Err(LinkError::NotConnected),
        };

        match result {
            Ok(()) => {
                let text = String::from_utf8_lossy(&frame);
                tlog!("[poller] Sent {:?}", text);
                self.status = format!("Sent: {:?}", text);
                Ok(())
            }
            Err(e) => {
                let lost = io::Error::new(e.kind(), e.to_string());
                self.connection.on_io_failure(lost);
                let err = LinkError::Write(e);
                self.status = err.to_string();
                Err(err)
            }
        }
    }

    /// Send the car to `destination`, using the last reported floor as origin (0 before any record).
    pub fn send_to_floor(&mut self, destination: i32) -> Result<(), LinkError> {
        let origin = self.display.floor.unwrap_or(0);
        self.send_command(CommandRequest::new(origin, destination))
    }

    // ========================================================================
    // Read-only views
    // ========================================================================

    pub fn history(&self) -> &TimeSeriesHistory {
        &self.history
    }

    pub fn snapshot(&self) -> Vec<HistoryEntry> {
        self.history.snapshot()
    }

    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn discarded_bytes(&self) -> u64 {
        self.framer.discarded_bytes()
    }
}

/// Read everything the link has buffered right now, without waiting for more.
fn drain_available(
    link: &mut dyn SerialLink,
    buf: &mut [u8],
    out: &mut Vec<u8>,
) -> io::Result<()> {
    loop {
        let available = link.bytes_available()?;
        if available == 0 {
            return Ok(());
        }

        let want = available.min(buf.len());
        match link.read(&mut buf[..want]) {
            Ok(0) => return Ok(()),
            Ok(n) => out.extend_from_slice(&buf[..n]),
            Err(ref e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
                ) =>
            {
                return Ok(());
            }
            Err(e) => return Err(e),
        }
    }
}
