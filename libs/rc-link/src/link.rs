//! Liveness of the link to the vehicle.
//!
//! ```text
//!                ping ok
//! Disconnected ----------> Connected
//!      ^                       |
//!      +-----------------------+
//!        ping or send failure
//! ```
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkState {
    #[default]
    Disconnected,
    Connected,
}

impl LinkState {
    pub fn is_connected(self) -> bool {
        self == LinkState::Connected
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LinkState::Disconnected => "Disconnected",
            LinkState::Connected => "Connected",
        }
    }
}

impl std::fmt::Display for LinkState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The connection flag, shared between the loops and the input side.
#[derive(Debug, Default)]
pub struct Link {
    connected: AtomicBool,
}

impl Link {
    pub fn state(&self) -> LinkState {
        if self.connected.load(Ordering::Acquire) {
            LinkState::Connected
        } else {
            LinkState::Disconnected
        }
    }

    pub fn is_connected(&self) -> bool {
        self.state().is_connected()
    }

    /// Records a successful ping. Returns true when this reconnected the link.
    pub fn ping_succeeded(&self) -> bool {
        !self.connected.swap(true, Ordering::AcqRel)
    }

    /// Records a failed ping or send. Returns true when this dropped the link.
    pub fn failed(&self) -> bool {
        self.connected.swap(false, Ordering::AcqRel)
    }

    pub fn reset(&self) {
        self.connected.store(false, Ordering::Release);
    }
}
