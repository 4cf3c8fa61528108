use std::time::Duration;

use crate::input::{AxisUpdate, JoystickId};
use crate::joystick::Point;
use crate::link::LinkState;
use crate::telemetry::Telemetry;

/// Everything a front end shows: link status, latency, telemetry, stick state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dashboard {
    pub link: LinkState,
    pub latency: Option<Duration>,
    pub telemetry: Option<Telemetry>,
    pub steering: i8,
    pub throttle: i8,
    pub steering_knob: Point,
    pub throttle_knob: Point,
    pub speed_limit: u8,
    pub speed_cap: bool,
}

impl Dashboard {
    pub fn status_text(&self) -> &'static str {
        self.link.as_str()
    }

    pub fn latency_text(&self) -> String {
        match self.latency {
            Some(latency) => format!("{}ms", latency.as_millis()),
            None => "--ms".to_string(),
        }
    }

    pub fn battery_text(&self) -> String {
        self.telemetry
            .as_ref()
            .map(Telemetry::battery_text)
            .unwrap_or_else(|| "--%".to_string())
    }

    pub fn speed_text(&self) -> String {
        self.telemetry
            .as_ref()
            .map(Telemetry::speed_text)
            .unwrap_or_else(|| "-- km/h".to_string())
    }

    pub fn speed_limit_text(&self) -> String {
        format!("{}%", self.speed_limit)
    }

    pub fn knob(&self, joystick: JoystickId) -> Point {
        match joystick {
            JoystickId::Steering => self.steering_knob,
            JoystickId::Throttle => self.throttle_knob,
        }
    }

    pub(crate) fn apply(&mut self, update: &AxisUpdate) {
        let deflection = update.deflection;
        match update.joystick {
            JoystickId::Steering => {
                self.steering = deflection.value;
                self.steering_knob = deflection.knob;
            }
            JoystickId::Throttle => {
                self.throttle = deflection.value;
                self.throttle_knob = deflection.knob;
            }
        }
    }

    pub(crate) fn set_disconnected(&mut self) {
        self.link = LinkState::Disconnected;
        self.latency = None;
    }
}
