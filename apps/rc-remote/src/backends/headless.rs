use crate::backends::{Action, Backend};
use anyhow::Result;
use async_trait::async_trait;
use rc_link::{Dashboard, LinkState};
use tracing::info;

/// Logs link and telemetry changes instead of drawing them. Takes no input.
#[derive(Default)]
pub struct HeadlessBackend {
    last_link: Option<LinkState>,
    last_telemetry: String,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Backend for HeadlessBackend {
    async fn render(&mut self, dashboard: &Dashboard) -> Result<()> {
        if self.last_link != Some(dashboard.link) {
            info!(
                "{} (latency {})",
                dashboard.status_text(),
                dashboard.latency_text()
            );
            self.last_link = Some(dashboard.link);
        }

        let telemetry = format!(
            "battery {} speed {}",
            dashboard.battery_text(),
            dashboard.speed_text()
        );
        if telemetry != self.last_telemetry {
            info!("{}", telemetry);
            self.last_telemetry = telemetry;
        }
        Ok(())
    }

    async fn next_action(&mut self) -> Result<Action> {
        std::future::pending().await
    }
}
