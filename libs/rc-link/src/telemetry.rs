use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::joystick::round_half_up;

/// Telemetry reported by the vehicle on `GET /telemetry`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    /// Battery charge in percent
    pub battery: f64,
    /// Ground speed in km/h
    pub speed: f64,
    /// Radio signal strength, when the vehicle reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal: Option<f64>,
}

impl Telemetry {
    pub fn from_json(buf: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(buf)?)
    }

    pub fn battery_text(&self) -> String {
        format!("{}%", format_number(self.battery))
    }

    /// Speed to one decimal, ties rounded up.
    pub fn speed_text(&self) -> String {
        format!("{:.1} km/h", round_half_up(self.speed * 10.0) / 10.0)
    }

    pub fn signal_text(&self) -> Option<String> {
        self.signal.map(|s| format!("{}%", format_number(s)))
    }
}

/// Formats whole numbers without a fractional part, everything else as is.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_firmware_report() {
        let telemetry = Telemetry::from_json(br#"{"battery":87,"speed":3.25,"signal":100}"#).unwrap();
        assert_eq!(telemetry.battery_text(), "87%");
        assert_eq!(telemetry.speed_text(), "3.3 km/h");
        assert_eq!(telemetry.signal_text().as_deref(), Some("100%"));
    }

    #[test]
    fn test_signal_is_optional() {
        let telemetry = Telemetry::from_json(br#"{"battery":55.5,"speed":0}"#).unwrap();
        assert_eq!(telemetry.signal, None);
        assert_eq!(telemetry.battery_text(), "55.5%");
        assert_eq!(telemetry.speed_text(), "0.0 km/h");
    }

    #[test]
    fn test_malformed() {
        assert!(Telemetry::from_json(b"OK").is_err());
        assert!(Telemetry::from_json(br#"{"battery":87}"#).is_err());
    }
}
