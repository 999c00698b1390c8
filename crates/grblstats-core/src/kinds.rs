//! Categorical tags describing the active communication and firmware mode.
//!
//! The `Display` form of each variant is the exact value that is reported to
//! the collection endpoint, so it must stay stable across releases.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Communication channel used to reach the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    /// Serial/USB connection
    #[default]
    UsbSerial,
    /// Alternative serial driver
    UsbSerial2,
    /// Raw TCP (telnet) connection
    Telnet,
    /// WebSocket bridge running on an ESP8266 module
    LaserWebEsp8266,
    /// Built-in machine emulator
    Emulator,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UsbSerial => write!(f, "UsbSerial"),
            Self::UsbSerial2 => write!(f, "UsbSerial2"),
            Self::Telnet => write!(f, "Telnet"),
            Self::LaserWebEsp8266 => write!(f, "LaserWebESP8266"),
            Self::Emulator => write!(f, "Emulator"),
        }
    }
}

/// Firmware family running on the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FirmwareKind {
    /// GRBL (default, most common)
    #[default]
    Grbl,
    /// Smoothieware
    Smoothie,
    /// Marlin
    Marlin,
    /// VigoWork laser boards
    VigoWork,
}

impl fmt::Display for FirmwareKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grbl => write!(f, "Grbl"),
            Self::Smoothie => write!(f, "Smoothie"),
            Self::Marlin => write!(f, "Marlin"),
            Self::VigoWork => write!(f, "VigoWork"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(TransportKind::default(), TransportKind::UsbSerial);
        assert_eq!(FirmwareKind::default(), FirmwareKind::Grbl);
    }

    #[test]
    fn test_display_values() {
        assert_eq!(TransportKind::LaserWebEsp8266.to_string(), "LaserWebESP8266");
        assert_eq!(TransportKind::Telnet.to_string(), "Telnet");
        assert_eq!(FirmwareKind::VigoWork.to_string(), "VigoWork");
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&TransportKind::UsbSerial2).unwrap();
        assert_eq!(json, "\"usb_serial2\"");

        let kind: FirmwareKind = serde_json::from_str("\"smoothie\"").unwrap();
        assert_eq!(kind, FirmwareKind::Smoothie);
    }
}
