//! Binary payloads posted to the vehicle's `/command` endpoint.
//!
//! Motor command, 4 bytes:
//!
//! | byte | meaning                                   |
//! |------|-------------------------------------------|
//! | 0    | tag, [`MOTOR_TAG`]                        |
//! | 1    | throttle, i8 as two's complement          |
//! | 2    | steering, i8 as two's complement          |
//! | 3    | `byte1 + byte2` wrapping at 256           |
//!
//! Emergency stop is the lone tag byte [`EMERGENCY_STOP_TAG`].
use crate::error::{Error, Result};
use crate::joystick::{AXIS_MAX, AXIS_MIN, round_half_up};

pub const MOTOR_TAG: u8 = 0x01;
pub const EMERGENCY_STOP_TAG: u8 = 0x03;
pub const MOTOR_COMMAND_LEN: usize = 4;

pub const SPEED_LIMIT_MAX: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MotorCommand {
    pub throttle: i8,
    pub steering: i8,
}

impl MotorCommand {
    pub fn new(throttle: i8, steering: i8) -> Self {
        Self { throttle, steering }
    }

    /// Scales throttle by a speed limit percentage, leaving steering untouched.
    pub fn limited(self, speed_limit: u8) -> Self {
        Self {
            throttle: scale_throttle(self.throttle, speed_limit),
            ..self
        }
    }

    pub fn checksum(&self) -> u8 {
        (self.throttle as u8).wrapping_add(self.steering as u8)
    }

    pub fn to_bytes(&self) -> [u8; MOTOR_COMMAND_LEN] {
        [
            MOTOR_TAG,
            self.throttle as u8,
            self.steering as u8,
            self.checksum(),
        ]
    }

    /// Returns a copy with both axes clamped to [-100, 100].
    pub fn clamped(self) -> Self {
        Self {
            throttle: self.throttle.clamp(AXIS_MIN, AXIS_MAX),
            steering: self.steering.clamp(AXIS_MIN, AXIS_MAX),
        }
    }
}

/// `round(throttle * limit / 100)`, rounding half-way cases up.
pub fn scale_throttle(throttle: i8, speed_limit: u8) -> i8 {
    let limit = speed_limit.min(SPEED_LIMIT_MAX) as f64;
    round_half_up(throttle as f64 * limit / 100.0) as i8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Motor(MotorCommand),
    EmergencyStop,
}

impl Command {
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Command::Motor(motor) => motor.to_bytes().to_vec(),
            Command::EmergencyStop => vec![EMERGENCY_STOP_TAG],
        }
    }

    pub fn decode(buf: &[u8]) -> Result<Self> {
        let (&tag, rest) = buf.split_first().ok_or(Error::EmptyCommand)?;
        match tag {
            MOTOR_TAG => {
                let [throttle, steering, checksum] = rest
                    .get(..3)
                    .and_then(|b| <[u8; 3]>::try_from(b).ok())
                    .ok_or(Error::TruncatedCommand(buf.len()))?;
                let motor = MotorCommand::new(throttle as i8, steering as i8);
                let expected = motor.checksum();
                if checksum != expected {
                    return Err(Error::ChecksumMismatch {
                        expected,
                        actual: checksum,
                    });
                }
                Ok(Command::Motor(motor))
            }
            EMERGENCY_STOP_TAG => Ok(Command::EmergencyStop),
            tag => Err(Error::UnknownCommand(tag)),
        }
    }
}

impl From<MotorCommand> for Command {
    fn from(motor: MotorCommand) -> Self {
        Command::Motor(motor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_motor_layout() {
        let bytes = MotorCommand::new(100, -100).to_bytes();
        assert_eq!(bytes, [0x01, 0x64, 0x9c, 0x00]);
        let bytes = MotorCommand::new(100, 100).to_bytes();
        assert_eq!(bytes, [0x01, 0x64, 0x64, 0xc8]);
    }

    #[test]
    fn test_checksum_wraps() {
        for throttle in i8::MIN..=i8::MAX {
            for steering in [i8::MIN, -100, -1, 0, 1, 100, i8::MAX] {
                let bytes = MotorCommand::new(throttle, steering).to_bytes();
                let sum = (bytes[1] as u16 + bytes[2] as u16) % 256;
                assert_eq!(bytes[3] as u16, sum);
            }
        }
    }

    #[test]
    fn test_speed_limit() {
        assert_eq!(MotorCommand::new(100, 30).limited(50), MotorCommand::new(50, 30));
        let limited = MotorCommand::new(-80, 0).limited(25);
        assert_eq!(limited.throttle, -20);
        assert_eq!(limited.to_bytes()[1], 0xec);
        assert_eq!(scale_throttle(-5, 50), -2);
        assert_eq!(scale_throttle(5, 50), 3);
        assert_eq!(scale_throttle(100, 0), 0);
        assert_eq!(scale_throttle(-100, 200), -100);
    }

    #[test]
    fn test_emergency_stop() {
        assert_eq!(Command::EmergencyStop.encode(), vec![0x03]);
        assert_eq!(Command::decode(&[0x03]).unwrap(), Command::EmergencyStop);
    }

    #[test]
    fn test_decode_motor() {
        let motor = MotorCommand::new(-20, 75);
        let decoded = Command::decode(&Command::from(motor).encode()).unwrap();
        assert_eq!(decoded, Command::Motor(motor));
    }

    #[test]
    fn test_decode_errors() {
        assert!(matches!(Command::decode(&[]), Err(Error::EmptyCommand)));
        assert!(matches!(
            Command::decode(&[0x02, 0, 0, 0]),
            Err(Error::UnknownCommand(0x02))
        ));
        assert!(matches!(
            Command::decode(&[0x01, 10, 10]),
            Err(Error::TruncatedCommand(3))
        ));
        assert!(matches!(
            Command::decode(&[0x01, 10, 10, 21]),
            Err(Error::ChecksumMismatch {
                expected: 20,
                actual: 21
            })
        ));
    }

    #[test]
    fn test_clamped() {
        let motor = MotorCommand::new(127, -128).clamped();
        assert_eq!(motor, MotorCommand::new(100, -100));
    }
}
