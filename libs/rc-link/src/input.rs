//! Pointer events and their routing to the steering and throttle joysticks.
//!
//! Each joystick owns at most one touch contact and, independently, the mouse.
//! Touches that start while a joystick already follows another contact are
//! ignored, and moves or ends from contacts a joystick does not own never reach
//! it, so two fingers on the two joysticks cannot disturb each other.
use smallvec::SmallVec;

use crate::joystick::{Deflection, Joystick, Orientation, Point};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoystickId {
    Steering,
    Throttle,
}

impl JoystickId {
    pub const ALL: [JoystickId; 2] = [JoystickId::Steering, JoystickId::Throttle];

    fn index(self) -> usize {
        match self {
            JoystickId::Steering => 0,
            JoystickId::Throttle => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerId {
    Mouse,
    Touch(u64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// A pointer went down on `target`, whose centre is at `center`.
    Down {
        pointer: PointerId,
        target: JoystickId,
        center: Point,
        position: Point,
    },
    Move {
        pointer: PointerId,
        position: Point,
    },
    Up {
        pointer: PointerId,
    },
    Cancel {
        pointer: PointerId,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisUpdate {
    pub joystick: JoystickId,
    pub deflection: Deflection,
}

pub type AxisUpdates = SmallVec<[AxisUpdate; 2]>;

#[derive(Debug, Clone)]
struct Stick {
    joystick: Joystick,
    touch: Option<u64>,
    mouse: bool,
}

impl Stick {
    fn new(orientation: Orientation, radius: f64) -> Self {
        Self {
            joystick: Joystick::new(orientation, radius),
            touch: None,
            mouse: false,
        }
    }

    fn owns(&self, pointer: PointerId) -> bool {
        match pointer {
            PointerId::Mouse => self.mouse,
            PointerId::Touch(id) => self.touch == Some(id),
        }
    }

    fn claim(&mut self, pointer: PointerId) -> bool {
        match pointer {
            PointerId::Mouse => {
                self.mouse = true;
                true
            }
            PointerId::Touch(_) if self.touch.is_some() => false,
            PointerId::Touch(id) => {
                self.touch = Some(id);
                true
            }
        }
    }

    fn release(&mut self, pointer: PointerId) {
        match pointer {
            PointerId::Mouse => self.mouse = false,
            PointerId::Touch(_) => self.touch = None,
        }
    }
}

/// The pair of joysticks: horizontal steering and vertical throttle.
#[derive(Debug, Clone)]
pub struct JoystickPad {
    sticks: [Stick; 2],
}

impl JoystickPad {
    pub fn new(radius: f64) -> Self {
        Self {
            sticks: [
                Stick::new(Orientation::Horizontal, radius),
                Stick::new(Orientation::Vertical, radius),
            ],
        }
    }

    pub fn joystick(&self, id: JoystickId) -> &Joystick {
        &self.sticks[id.index()].joystick
    }

    /// Routes one event, returning the axis updates it caused.
    pub fn handle(&mut self, event: PointerEvent) -> AxisUpdates {
        let mut updates = AxisUpdates::new();
        match event {
            PointerEvent::Down {
                pointer,
                target,
                center,
                position,
            } => {
                let stick = &mut self.sticks[target.index()];
                if stick.claim(pointer) {
                    updates.push(AxisUpdate {
                        joystick: target,
                        deflection: stick.joystick.press(center, position),
                    });
                } else {
                    tracing::trace!(?pointer, ?target, "joystick busy, ignoring contact");
                }
            }
            PointerEvent::Move { pointer, position } => {
                for (id, stick) in JoystickId::ALL.into_iter().zip(&mut self.sticks) {
                    if stick.owns(pointer) {
                        updates.push(AxisUpdate {
                            joystick: id,
                            deflection: stick.joystick.drag(position),
                        });
                    }
                }
            }
            PointerEvent::Up { pointer } | PointerEvent::Cancel { pointer } => {
                for (id, stick) in JoystickId::ALL.into_iter().zip(&mut self.sticks) {
                    if stick.owns(pointer) {
                        stick.release(pointer);
                        updates.push(AxisUpdate {
                            joystick: id,
                            deflection: stick.joystick.recenter(),
                        });
                    }
                }
            }
        }
        updates
    }

    /// Recentres both knobs without ending any drag.
    pub fn recenter(&mut self) -> AxisUpdates {
        JoystickId::ALL
            .into_iter()
            .zip(&mut self.sticks)
            .map(|(id, stick)| AxisUpdate {
                joystick: id,
                deflection: stick.joystick.recenter(),
            })
            .collect()
    }
}
