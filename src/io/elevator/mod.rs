// src/io/elevator/mod.rs
//
// Elevator controller protocol: telemetry/command codec, operator display
// state, and the poller that ties the serial link to both.

pub mod codec;
pub mod display;
pub mod poller;

pub use codec::{CommandRequest, ElevatorCodec, MotorState, TelemetryRecord};
pub use display::DisplayState;
pub use poller::{PollSummary, TelemetryPoller, TelemetrySink};
