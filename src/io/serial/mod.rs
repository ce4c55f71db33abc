// src/io/serial/mod.rs
//
// Serial link to the elevator controller.
//
// Features:
// - Carriage-return line framing with a per-line length cap
// - Fixed 19200 8-N-1 line settings and port enumeration
// - Connection state machine owning the single port handle

pub mod connection;
pub mod framer;
pub mod link;
pub mod utils;

pub use connection::{Connection, ConnectionState};
pub use framer::{LineFramer, Lines, DEFAULT_MAX_LINE_LENGTH, LINE_TERMINATOR};
pub use link::{LinkOpener, SerialLink, SystemSerialOpener};
pub use utils::{
    default_port_prefix, list_serial_ports, SerialPortInfo, BAUD_RATE, WRITE_TIMEOUT,
};
