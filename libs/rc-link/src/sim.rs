//! A simulated vehicle serving `/telemetry` and `/command`, for bench testing the
//! client without hardware.
//!
//! Motor commands are clamped to [-100, 100]. When no motor command arrives for
//! [`VehicleConfig::motor_timeout_ms`] the motors stop, as does an emergency stop.
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::{Json, Router};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::command::{Command, MotorCommand};
use crate::error::Result;
use crate::telemetry::Telemetry;

/// Bodies at least this long are rejected.
pub const MAX_COMMAND_LEN: usize = 100;

const PHYSICS_PERIOD: Duration = Duration::from_millis(50);
// fraction of the gap to the target speed closed per physics step
const SPEED_RESPONSE: f64 = 0.2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleConfig {
    pub addr: SocketAddr,
    pub motor_timeout_ms: u64,
    /// Speed at full throttle, km/h
    pub top_speed: f64,
    pub battery: f64,
    pub signal: f64,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            motor_timeout_ms: 500,
            top_speed: 12.0,
            battery: 87.0,
            signal: 100.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VehicleState {
    pub motors: MotorCommand,
    pub speed: f64,
    pub motor_commands: u64,
    pub emergency_stops: u64,
    pub rejected: u64,
    last_motor_command: Option<Instant>,
}

#[derive(Clone)]
pub struct Vehicle {
    config: Arc<VehicleConfig>,
    state: Arc<Mutex<VehicleState>>,
}

impl Vehicle {
    pub fn new(config: VehicleConfig) -> Self {
        Self {
            config: Arc::new(config),
            state: Arc::default(),
        }
    }

    fn state(&self) -> MutexGuard<'_, VehicleState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> VehicleState {
        self.state().clone()
    }

    pub fn telemetry(&self) -> Telemetry {
        Telemetry {
            battery: self.config.battery,
            speed: self.state().speed,
            signal: Some(self.config.signal),
        }
    }

    /// Decodes and applies one `/command` body.
    pub fn apply(&self, body: &[u8]) -> Result<Command> {
        let command = Command::decode(body);
        let mut state = self.state();
        match command {
            Ok(Command::Motor(motor)) => {
                state.motors = motor.clamped();
                state.motor_commands += 1;
                state.last_motor_command = Some(Instant::now());
            }
            Ok(Command::EmergencyStop) => {
                warn!("emergency stop received");
                state.motors = MotorCommand::default();
                state.emergency_stops += 1;
            }
            Err(_) => state.rejected += 1,
        }
        command
    }

    /// Advances speed by one physics step and enforces the motor timeout.
    pub fn step(&self, dt: Duration) {
        let timeout = Duration::from_millis(self.config.motor_timeout_ms);
        let mut state = self.state();
        let stale = state
            .last_motor_command
            .is_some_and(|at| at.elapsed() > timeout);
        if stale && state.motors != MotorCommand::default() {
            warn!("motor command timeout, stopping motors");
            state.motors = MotorCommand::default();
        }
        let target = (state.motors.throttle as f64).abs() / 100.0 * self.config.top_speed;
        let response = (SPEED_RESPONSE * dt.as_secs_f64() / PHYSICS_PERIOD.as_secs_f64()).min(1.0);
        state.speed += (target - state.speed) * response;
    }

    pub fn spawn_physics(&self) -> JoinHandle<()> {
        let vehicle = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(PHYSICS_PERIOD);
            loop {
                interval.tick().await;
                vehicle.step(PHYSICS_PERIOD);
            }
        })
    }
}

pub fn router(vehicle: Vehicle) -> Router {
    Router::new()
        .route("/telemetry", get(telemetry))
        .route("/command", post(command))
        .with_state(vehicle)
}

/// Serves the vehicle on `listener` until the server fails.
pub async fn serve(listener: TcpListener, vehicle: Vehicle) -> Result<()> {
    info!(addr = ?listener.local_addr()?, "simulated vehicle listening");
    let physics = vehicle.spawn_physics();
    let res = axum::serve(listener, router(vehicle)).await;
    physics.abort();
    Ok(res?)
}

async fn telemetry(State(vehicle): State<Vehicle>) -> Json<Telemetry> {
    Json(vehicle.telemetry())
}

async fn command(State(vehicle): State<Vehicle>, body: Bytes) -> impl IntoResponse {
    if body.len() >= MAX_COMMAND_LEN {
        return (StatusCode::BAD_REQUEST, "Content too long");
    }
    match vehicle.apply(&body) {
        Ok(command) => {
            debug!(?command, "command");
            (StatusCode::OK, "OK")
        }
        Err(err) => {
            warn!(?err, "rejected command");
            (StatusCode::BAD_REQUEST, "Bad command")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_motor_timeout() {
        let vehicle = Vehicle::new(VehicleConfig::default());
        vehicle.apply(&[0x01, 100, 0, 100]).unwrap();
        vehicle.step(PHYSICS_PERIOD);
        assert_eq!(vehicle.snapshot().motors, MotorCommand::new(100, 0));
        assert!(vehicle.telemetry().speed > 0.0);

        tokio::time::advance(Duration::from_millis(600)).await;
        vehicle.step(PHYSICS_PERIOD);
        assert_eq!(vehicle.snapshot().motors, MotorCommand::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_apply() {
        let vehicle = Vehicle::new(VehicleConfig::default());
        // 127 + 0x81 wraps to 0
        vehicle.apply(&[0x01, 127, 0x81, 0x00]).unwrap();
        assert_eq!(vehicle.snapshot().motors, MotorCommand::new(100, -100));

        assert_eq!(vehicle.apply(&[0x03]).unwrap(), Command::EmergencyStop);
        assert!(vehicle.apply(&[0x01, 1, 1, 7]).is_err());

        let state = vehicle.snapshot();
        assert_eq!(state.motors, MotorCommand::default());
        assert_eq!(state.motor_commands, 1);
        assert_eq!(state.emergency_stops, 1);
        assert_eq!(state.rejected, 1);
    }
}
