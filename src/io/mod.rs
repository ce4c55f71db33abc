// src/io/mod.rs
//
// I/O layer for the elevator controller link: the line codec trait, the
// serial transport, and the elevator protocol built on top of them.

pub mod codec; // Line codec trait
pub mod elevator;
pub mod serial;

pub use codec::LineCodec;

use std::time::{SystemTime, UNIX_EPOCH};

/// Get current time in microseconds since UNIX epoch
pub fn now_us() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(0)
}
