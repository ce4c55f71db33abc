// src/io/elevator/display.rs
//
// Latest-value indicators shown to the operator.

use std::fmt;

use serde::Serialize;

use super::codec::{MotorState, TelemetryRecord};

const PLACEHOLDER: &str = "-";

/// Most recent accepted telemetry values. Every field is `None` until the first record.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DisplayState {
    pub floor: Option<i32>,
    pub destination: Option<i32>,
    pub motor: Option<MotorState>,
    pub position: Option<i32>,
    pub velocity: Option<f64>,
    pub temperature: Option<f64>,
}

impl DisplayState {
    pub fn update(&mut self, record: &TelemetryRecord) {
        self.floor = Some(record.floor());
        self.destination = Some(record.destination());
        self.motor = Some(record.motor());
        self.position = Some(record.position());
        self.velocity = Some(record.velocity());
        self.temperature = Some(record.temperature());
    }

    pub fn floor_text(&self) -> String {
        text_or_placeholder(self.floor)
    }

    pub fn destination_text(&self) -> String {
        text_or_placeholder(self.destination)
    }

    pub fn motor_text(&self) -> String {
        text_or_placeholder(self.motor)
    }

    pub fn position_text(&self) -> String {
        text_or_placeholder(self.position)
    }

    pub fn velocity_text(&self) -> String {
        one_decimal(self.velocity)
    }

    pub fn temperature_text(&self) -> String {
        one_decimal(self.temperature)
    }
}

impl fmt::Display for DisplayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "floor {} | dest {} | motor {} | pos {} mm | vel {} mm/s | temp {} °C",
            self.floor_text(),
            self.destination_text(),
            self.motor_text(),
            self.position_text(),
            self.velocity_text(),
            self.temperature_text()
        )
    }
}

fn text_or_placeholder<T: fmt::Display>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

fn one_decimal(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.1}", v))
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders_before_first_record() {
        let display = DisplayState::default();
        assert_eq!(display.floor_text(), "-");
        assert_eq!(display.velocity_text(), "-");
        assert_eq!(
            display.to_string(),
            "floor - | dest - | motor - | pos - mm | vel - mm/s | temp - °C"
        );
    }

    #[test]
    fn test_update_formats_like_indicators() {
        let mut display = DisplayState::default();
        display.update(&TelemetryRecord::new_for_test(
            1,
            3,
            MotorState::Ascending,
            45,
            12.0,
            27.26,
        ));

        assert_eq!(display.floor_text(), "1");
        assert_eq!(display.motor_text(), "Ascending");
        assert_eq!(display.position_text(), "45");
        assert_eq!(display.velocity_text(), "12.0");
        assert_eq!(display.temperature_text(), "27.3");
    }
}
