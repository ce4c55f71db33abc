// src/io/serial/utils.rs
//
// Fixed line settings for the elevator controller and port enumeration.

use std::time::Duration;

use serde::Serialize;
use serialport::{DataBits, Parity, StopBits};

// ============================================================================
// Line Settings
// ============================================================================

/// Controller link speed. The controller only speaks 19200 8-N-1.
pub const BAUD_RATE: u32 = 19200;

/// Upper bound on a single command write
pub const WRITE_TIMEOUT: Duration = Duration::from_secs(1);

pub(crate) const DATA_BITS: DataBits = DataBits::Eight;
pub(crate) const STOP_BITS: StopBits = StopBits::One;
pub(crate) const PARITY: Parity = Parity::None;

/// Information about an available serial port
#[derive(Clone, Debug, Serialize)]
pub struct SerialPortInfo {
    pub port_name: String,
    pub port_type: String,
    pub manufacturer: Option<String>,
    pub product: Option<String>,
    pub serial_number: Option<String>,
    pub vid: Option<u16>,
    pub pid: Option<u16>,
}

// ============================================================================
// Port Enumeration
// ============================================================================

/// Default name prefix for the port picker. The controller shows up as a COM port on Windows.
pub fn default_port_prefix() -> Option<String> {
    if cfg!(target_os = "windows") {
        Some("COM".to_string())
    } else {
        None
    }
}

/// Case-insensitive port-name prefix match. `None` accepts every port.
pub fn matches_prefix(port_name: &str, prefix: Option<&str>) -> bool {
    match prefix {
        Some(prefix) => port_name
            .to_uppercase()
            .starts_with(&prefix.to_uppercase()),
        None => true,
    }
}

/// List available serial ports, optionally keeping only names that start with `prefix`.
///
/// On macOS, filters out /dev/tty.* devices and only shows /dev/cu.* devices.
/// The tty devices block on open waiting for carrier detect.
pub fn list_serial_ports(prefix: Option<&str>) -> Result<Vec<SerialPortInfo>, String> {
    let ports = serialport::available_ports()
        .map_err(|e| format!("Failed to enumerate ports: {}", e))?;

    Ok(ports
        .into_iter()
        .filter(|_p| {
            #[cfg(target_os = "macos")]
            {
                !_p.port_name.starts_with("/dev/tty.")
            }
            #[cfg(not(target_os = "macos"))]
            {
                true
            }
        })
        .filter(|p| matches_prefix(&p.port_name, prefix))
        .map(|p| {
            let (port_type, manufacturer, product, serial_number, vid, pid) = match p.port_type {
                serialport::SerialPortType::UsbPort(info) => (
                    "USB".to_string(),
                    info.manufacturer,
                    info.product,
                    info.serial_number,
                    Some(info.vid),
                    Some(info.pid),
                ),
                serialport::SerialPortType::BluetoothPort => {
                    ("Bluetooth".to_string(), None, None, None, None, None)
                }
                serialport::SerialPortType::PciPort => {
                    ("PCI".to_string(), None, None, None, None, None)
                }
                serialport::SerialPortType::Unknown => {
                    ("Unknown".to_string(), None, None, None, None, None)
                }
            };
            SerialPortInfo {
                port_name: p.port_name,
                port_type,
                manufacturer,
                product,
                serial_number,
                vid,
                pid,
            }
        })
        .collect())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_settings_are_fixed_8n1() {
        assert_eq!(BAUD_RATE, 19200);
        assert_eq!(DATA_BITS, DataBits::Eight);
        assert_eq!(STOP_BITS, StopBits::One);
        assert_eq!(PARITY, Parity::None);
        assert_eq!(WRITE_TIMEOUT, Duration::from_secs(1));
    }

    #[test]
    fn test_matches_prefix() {
        assert!(matches_prefix("COM3", Some("COM")));
        assert!(matches_prefix("com4", Some("COM")));
        assert!(!matches_prefix("/dev/ttyUSB0", Some("COM")));
        assert!(matches_prefix("/dev/ttyUSB0", Some("/dev/ttyUSB")));
        assert!(matches_prefix("/dev/ttyACM0", None));
    }
}
