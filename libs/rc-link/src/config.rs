use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::command::SPEED_LIMIT_MAX;
use crate::error::Result;
use crate::joystick::DEFAULT_RADIUS;

/// Tuning of a [`crate::Session`]. Periods are in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Base url of the vehicle, e.g. `http://192.168.4.1`
    pub url: String,
    pub send_period_ms: u64,
    pub telemetry_period_ms: u64,
    pub ping_period_ms: u64,
    /// Knob travel in pixels
    pub joystick_radius: f64,
    /// Scale throttle by the speed limit before sending
    pub speed_cap: bool,
    pub speed_limit: u8,
    /// Keep posting commands while the link is down
    pub transmit_while_disconnected: bool,
    pub request_timeout_ms: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            url: "http://192.168.4.1".to_string(),
            send_period_ms: 20,
            telemetry_period_ms: 100,
            ping_period_ms: 1000,
            joystick_radius: DEFAULT_RADIUS,
            speed_cap: true,
            speed_limit: 50,
            transmit_while_disconnected: false,
            request_timeout_ms: None,
        }
    }
}

impl SessionConfig {
    /// Reads a standalone session file; missing keys take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    pub fn send_period(&self) -> Duration {
        period(self.send_period_ms)
    }

    pub fn telemetry_period(&self) -> Duration {
        period(self.telemetry_period_ms)
    }

    pub fn ping_period(&self) -> Duration {
        period(self.ping_period_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    pub fn initial_speed_limit(&self) -> u8 {
        self.speed_limit.min(SPEED_LIMIT_MAX)
    }
}

// tokio intervals panic on a zero period
fn period(ms: u64) -> Duration {
    Duration::from_millis(ms.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml() {
        let config: SessionConfig = toml::from_str(
            r#"
            url = "http://127.0.0.1:8080"
            speed_limit = 180
            ping_period_ms = 0
            "#,
        )
        .unwrap();
        assert_eq!(config.url, "http://127.0.0.1:8080");
        assert_eq!(config.send_period(), Duration::from_millis(20));
        assert_eq!(config.telemetry_period(), Duration::from_millis(100));
        assert_eq!(config.ping_period(), Duration::from_millis(1));
        assert_eq!(config.initial_speed_limit(), 100);
        assert!(config.speed_cap);
        assert_eq!(config.request_timeout(), None);
    }

    #[test]
    fn test_from_file() {
        let dir = std::env::temp_dir().join(format!("rc-link-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let path = dir.join("session.toml");
        std::fs::write(&path, "url = \"http://10.0.0.2\"\nsend_period_ms = 40\n").unwrap();
        let config = SessionConfig::from_file(&path).unwrap();
        assert_eq!(config.url, "http://10.0.0.2");
        assert_eq!(config.send_period(), Duration::from_millis(40));
        assert_eq!(config.ping_period(), Duration::from_millis(1000));

        let broken = dir.join("broken.toml");
        std::fs::write(&broken, "send_period_ms = \"fast\"").unwrap();
        assert!(matches!(
            SessionConfig::from_file(&broken),
            Err(crate::Error::Toml(_))
        ));
        assert!(matches!(
            SessionConfig::from_file(dir.join("missing.toml")),
            Err(crate::Error::Io(_))
        ));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
