use anyhow::Result;
use rc_link::SessionConfig;
use rc_link::sim::VehicleConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub session: SessionConfig,
    pub terminal: TerminalConfig,
    pub sim: VehicleConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    /// Pixel size of one terminal cell, used to map mouse cells onto joystick pixels
    pub cell_width_px: f64,
    pub cell_height_px: f64,
    pub refresh_rate_hz: f32,
    pub speed_limit_step: u8,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            cell_width_px: 8.0,
            cell_height_px: 16.0,
            refresh_rate_hz: 30.0,
            speed_limit_step: 5,
        }
    }
}

impl Config {
    pub fn from_file_or_default(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            let contents = fs::read_to_string(path)?;
            Ok(toml::from_str(&contents)?)
        } else {
            tracing::info!("Config file not found at {}, using defaults", path);
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sections_are_optional() {
        let config: Config = toml::from_str(
            r#"
            [session]
            url = "http://10.0.0.7"

            [sim]
            motor_timeout_ms = 250
            "#,
        )
        .unwrap();
        assert_eq!(config.session.url, "http://10.0.0.7");
        assert_eq!(config.session.send_period_ms, 20);
        assert_eq!(config.sim.motor_timeout_ms, 250);
        assert_eq!(config.terminal.refresh_rate_hz, 30.0);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = Config::from_file_or_default("/nonexistent/rc-remote.toml").unwrap();
        assert_eq!(config.session.ping_period_ms, 1000);
        assert_eq!(config.sim.battery, 87.0);
    }
}
