//! Remote-control link for a small wheeled vehicle.
//!
//! Pointer drags on two on-screen joysticks become steering and throttle values,
//! which a [`Session`] streams to the vehicle as compact binary commands over HTTP
//! while polling telemetry and tracking link liveness.
//!
//! - [`joystick`]: drag offset to axis value math.
//! - [`input`]: pointer-keyed drag sessions for the two joysticks.
//! - [`command`]: the wire payloads sent to `/command`.
//! - [`session`]: the send, telemetry and ping loops.
pub mod command;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod input;
pub mod joystick;
pub mod link;
pub mod session;
#[cfg(feature = "sim")]
pub mod sim;
pub mod telemetry;
pub mod transport;

pub use command::{Command, MotorCommand};
pub use config::SessionConfig;
pub use dashboard::Dashboard;
pub use error::*;
pub use input::{JoystickId, PointerEvent, PointerId};
pub use joystick::Point;
pub use link::LinkState;
pub use session::Session;
pub use telemetry::Telemetry;
pub use transport::{HttpTransport, Transport};
