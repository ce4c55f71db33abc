// src/io/elevator/codec.rs
//
// Elevator controller ASCII protocol codec.
//
// Frame formats:
//   Telemetry (inbound): [$]<floor>,<dest>,<motor>,<position>,<velocity>,<temperature>\r
//                        e.g. $1,3,3,045,12.5,27.3\r
//   Command (outbound):  $<origin><dest>\r   (single digits 0-3, no comma)
//                        e.g. $02\r

use std::fmt;

use serde::Serialize;

use crate::error::{RejectReason, ValidationError};
use crate::io::codec::LineCodec;

/// Number of comma-separated fields in a telemetry line
pub const TELEMETRY_FIELDS: usize = 6;

/// Highest floor index on the four-floor shaft
pub const TOP_FLOOR: i32 = 3;

const FRAME_START: char = '$';

/// Controller-reported movement status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MotorState {
    Stopped,
    Descending,
    Ascending,
    Unknown(i32),
}

impl MotorState {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => MotorState::Stopped,
            2 => MotorState::Descending,
            3 => MotorState::Ascending,
            other => MotorState::Unknown(other),
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            MotorState::Stopped => 0,
            MotorState::Descending => 2,
            MotorState::Ascending => 3,
            MotorState::Unknown(code) => *code,
        }
    }
}

impl fmt::Display for MotorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotorState::Stopped => write!(f, "Stopped"),
            MotorState::Descending => write!(f, "Descending"),
            MotorState::Ascending => write!(f, "Ascending"),
            MotorState::Unknown(code) => write!(f, "Unknown ({})", code),
        }
    }
}

/// One decoded status message from the controller. Only `ElevatorCodec::decode` creates one.
///
/// Floor and destination are not range-checked on the way in: an out-of-range
/// value is kept as reported so it stays visible to the operator.
///
/// ```
/// use elevator_link::{ElevatorCodec, MotorState};
/// use elevator_link::io::LineCodec;
///
/// let record = ElevatorCodec::decode(b"$1,3,3,045,12.5,27.3").unwrap();
/// assert_eq!(record.motor(), MotorState::Ascending);
/// assert_eq!(record.position(), 45);
/// ```
///
/// Records cannot be assembled or edited by hand:
///
/// ```compile_fail
/// use elevator_link::{ElevatorCodec, MotorState};
/// use elevator_link::io::LineCodec;
///
/// let mut record = ElevatorCodec::decode(b"$1,3,3,045,12.5,27.3").unwrap();
/// record.floor = 2;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryRecord {
    floor: i32,
    destination: i32,
    motor: MotorState,
    position: i32,
    velocity: f64,
    temperature: f64,
}

impl TelemetryRecord {
    pub fn floor(&self) -> i32 {
        self.floor
    }

    pub fn destination(&self) -> i32 {
        self.destination
    }

    pub fn motor(&self) -> MotorState {
        self.motor
    }

    /// Car position in millimeters
    pub fn position(&self) -> i32 {
        self.position
    }

    /// mm/s
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    /// °C
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    #[cfg(test)]
    pub(crate) fn new_for_test(
        floor: i32,
        destination: i32,
        motor: MotorState,
        position: i32,
        velocity: f64,
        temperature: f64,
    ) -> Self {
        Self {
            floor,
            destination,
            motor,
            position,
            velocity,
            temperature,
        }
    }
}

/// Operator request to move the car from `origin` to `destination`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandRequest {
    pub origin: i32,
    pub destination: i32,
}

impl CommandRequest {
    pub fn new(origin: i32, destination: i32) -> Self {
        Self {
            origin,
            destination,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(0..=TOP_FLOOR).contains(&self.origin) {
            return Err(ValidationError::OriginOutOfRange(self.origin));
        }
        if !(0..=TOP_FLOOR).contains(&self.destination) {
            return Err(ValidationError::DestinationOutOfRange(self.destination));
        }
        Ok(())
    }
}

/// Elevator controller line codec.
pub struct ElevatorCodec;

impl LineCodec for ElevatorCodec {
    type Record = TelemetryRecord;
    type Reject = RejectReason;
    type Command = CommandRequest;
    type Invalid = ValidationError;

    /// Decode a telemetry line.
    ///
    /// Examples:
    ///   `$1,3,3,045,12.5,27.3` -> floor 1, destination 3, ascending, 45 mm, 12.5 mm/s, 27.3 °C
    ///   `2,0,0,000,0.0,22.0`   -> leading `$` is optional
    fn decode(line: &[u8]) -> Result<TelemetryRecord, RejectReason> {
        // Non-ASCII bytes are dropped rather than failing the whole line
        let text: String = line
            .iter()
            .filter(|b| b.is_ascii())
            .map(|&b| b as char)
            .collect();
        let text = text.trim();

        if text.is_empty() {
            return Err(RejectReason::EmptyLine);
        }

        let payload = text.strip_prefix(FRAME_START).unwrap_or(text);
        let fields: Vec<&str> = payload.split(',').map(str::trim).collect();

        if fields.len() != TELEMETRY_FIELDS {
            return Err(RejectReason::FieldCountMismatch {
                count: fields.len(),
                raw: payload.to_string(),
            });
        }

        let parse_error = |index: usize| RejectReason::FieldParseError {
            index,
            fields: fields.iter().map(|f| f.to_string()).collect(),
        };

        let floor = fields[0].parse::<i32>().map_err(|_| parse_error(0))?;
        let destination = fields[1].parse::<i32>().map_err(|_| parse_error(1))?;
        let motor_code = fields[2].parse::<i32>().map_err(|_| parse_error(2))?;
        let position = fields[3].parse::<i32>().map_err(|_| parse_error(3))?;
        let velocity = fields[4].parse::<f64>().map_err(|_| parse_error(4))?;
        let temperature = fields[5].parse::<f64>().map_err(|_| parse_error(5))?;

        Ok(TelemetryRecord {
            floor,
            destination,
            motor: MotorState::from_code(motor_code),
            position,
            velocity,
            temperature,
        })
    }

    /// Encode a command to `$` + origin digit + destination digit + `\r`.
    fn encode(command: &CommandRequest) -> Result<Vec<u8>, ValidationError> {
        command.validate()?;

        let mut frame = String::with_capacity(4);
        frame.push(FRAME_START);
        frame.push_str(&command.origin.to_string());
        frame.push_str(&command.destination.to_string());
        frame.push('\r');
        Ok(frame.into_bytes())
    }
}
