//! Drag offset to axis value conversion for a single on-screen joystick.
//!
//! Offsets are measured in screen pixels from the joystick centre captured at
//! press time. The knob never leaves the circle of radius [`Joystick::radius`];
//! a drag past the rim is projected back onto it along the same angle, so the
//! reported value saturates at exactly ±100.
use serde::{Deserialize, Serialize};

/// Maximum knob travel from the centre, in pixels.
pub const DEFAULT_RADIUS: f64 = 40.0;

pub const AXIS_MIN: i8 = -100;
pub const AXIS_MAX: i8 = 100;

/// A screen position or offset in pixels, y growing downwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

impl std::ops::Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Which screen axis a joystick reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Up is positive.
    Vertical,
    /// Right is positive.
    Horizontal,
}

/// Knob position and axis value produced by a drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Deflection {
    pub knob: Point,
    pub value: i8,
}

impl Deflection {
    pub const CENTERED: Deflection = Deflection {
        knob: Point::ZERO,
        value: 0,
    };
}

/// Rounds half-way cases towards positive infinity, so `-2.5` becomes `-2`.
pub fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

/// Clamps `offset` onto the disc of the given radius, keeping its angle.
pub fn clamp_to_radius(offset: Point, radius: f64) -> Point {
    if offset.length() > radius {
        let angle = offset.y.atan2(offset.x);
        Point::new(angle.cos() * radius, angle.sin() * radius)
    } else {
        offset
    }
}

/// Converts an already clamped knob offset into an axis value in [-100, 100].
pub fn axis_value(knob: Point, radius: f64, orientation: Orientation) -> i8 {
    let ratio = match orientation {
        Orientation::Vertical => -knob.y / radius,
        Orientation::Horizontal => knob.x / radius,
    };
    round_half_up(ratio * 100.0).clamp(AXIS_MIN as f64, AXIS_MAX as f64) as i8
}

/// Geometry and drag origin of one joystick.
#[derive(Debug, Clone)]
pub struct Joystick {
    orientation: Orientation,
    radius: f64,
    origin: Point,
    knob: Point,
}

impl Joystick {
    pub fn new(orientation: Orientation, radius: f64) -> Self {
        Self {
            orientation,
            radius,
            origin: Point::ZERO,
            knob: Point::ZERO,
        }
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn knob(&self) -> Point {
        self.knob
    }

    /// Starts a drag: `center` becomes the origin and `position` is handled as the
    /// first move.
    pub fn press(&mut self, center: Point, position: Point) -> Deflection {
        self.origin = center;
        self.drag(position)
    }

    pub fn drag(&mut self, position: Point) -> Deflection {
        self.knob = clamp_to_radius(position - self.origin, self.radius);
        Deflection {
            knob: self.knob,
            value: axis_value(self.knob, self.radius, self.orientation),
        }
    }

    pub fn recenter(&mut self) -> Deflection {
        self.knob = Point::ZERO;
        Deflection::CENTERED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CENTER: Point = Point::new(200.0, 300.0);

    fn at(dx: f64, dy: f64) -> Point {
        Point::new(CENTER.x + dx, CENTER.y + dy)
    }

    #[test]
    fn test_drag_past_rim_is_projected() {
        let mut stick = Joystick::new(Orientation::Horizontal, DEFAULT_RADIUS);
        let deflection = stick.press(CENTER, at(60.0, 0.0));
        assert_eq!(deflection.knob, Point::new(40.0, 0.0));
        assert_eq!(deflection.value, 100);
    }

    #[test]
    fn test_saturates_in_both_directions() {
        let mut steering = Joystick::new(Orientation::Horizontal, DEFAULT_RADIUS);
        steering.press(CENTER, CENTER);
        assert_eq!(steering.drag(at(-500.0, 0.0)).value, -100);
        assert_eq!(steering.drag(at(500.0, 0.0)).value, 100);

        let mut throttle = Joystick::new(Orientation::Vertical, DEFAULT_RADIUS);
        throttle.press(CENTER, CENTER);
        assert_eq!(throttle.drag(at(0.0, -41.0)).value, 100);
        assert_eq!(throttle.drag(at(0.0, 90.0)).value, -100);
    }

    #[test]
    fn test_vertical_is_inverted_screen_y() {
        let mut throttle = Joystick::new(Orientation::Vertical, DEFAULT_RADIUS);
        assert_eq!(throttle.press(CENTER, at(0.0, -20.0)).value, 50);
        assert_eq!(throttle.drag(at(15.0, 10.0)).value, -25);
    }

    #[test]
    fn test_diagonal_keeps_angle() {
        let mut steering = Joystick::new(Orientation::Horizontal, DEFAULT_RADIUS);
        let deflection = steering.press(CENTER, at(100.0, 100.0));
        assert!((deflection.knob.length() - DEFAULT_RADIUS).abs() < 1e-9);
        assert!((deflection.knob.x - deflection.knob.y).abs() < 1e-9);
        // 40 * cos(pi / 4) / 40 * 100
        assert_eq!(deflection.value, 71);
    }

    #[test]
    fn test_value_always_in_range() {
        let mut stick = Joystick::new(Orientation::Vertical, DEFAULT_RADIUS);
        stick.press(CENTER, CENTER);
        for dx in (-200..=200).step_by(7) {
            for dy in (-200..=200).step_by(11) {
                let deflection = stick.drag(at(dx as f64, dy as f64));
                assert!((AXIS_MIN..=AXIS_MAX).contains(&deflection.value));
                assert!(deflection.knob.length() <= DEFAULT_RADIUS + 1e-9);
            }
        }
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(-2.6), -3.0);
        assert_eq!(round_half_up(0.49), 0.0);
    }

    #[test]
    fn test_recenter() {
        let mut stick = Joystick::new(Orientation::Horizontal, DEFAULT_RADIUS);
        stick.press(CENTER, at(10.0, 5.0));
        assert_eq!(stick.recenter(), Deflection::CENTERED);
        assert_eq!(stick.knob(), Point::ZERO);
    }
}
