pub mod headless;
pub mod terminal;

pub use headless::HeadlessBackend;
pub use terminal::TerminalBackend;

use anyhow::Result;
use async_trait::async_trait;
use rc_link::{Dashboard, PointerEvent};

/// Something the operator asked for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Pointer(PointerEvent),
    EmergencyStop,
    /// Change the speed limit by this many percent
    AdjustSpeedLimit(i16),
    Redraw,
    Quit,
}

/// Front end trait: draws the dashboard and produces operator actions
#[async_trait]
pub trait Backend: Send {
    /// Render the current dashboard
    async fn render(&mut self, dashboard: &Dashboard) -> Result<()>;

    /// Wait for the next operator action. Must be cancel safe.
    async fn next_action(&mut self) -> Result<Action>;

    /// Optional: Handle initialization
    async fn init(&mut self) -> Result<()> {
        Ok(())
    }

    /// Optional: Handle cleanup
    async fn cleanup(&mut self) -> Result<()> {
        Ok(())
    }
}
