//! Screen layout of the terminal remote: a status bar, the steering pad on the
//! left, the throttle pad on the right and a key help line.
use rc_link::joystick::round_half_up;
use rc_link::{Dashboard, JoystickId, Point, PointerEvent, PointerId};

use crate::config::TerminalConfig;
use crate::grid::TextGrid;

const HELP: &str = "drag the pads with the mouse  [space] stop  [+/-] speed limit  [q] quit";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pad {
    pub id: JoystickId,
    pub center_col: u16,
    pub center_row: u16,
    pub half_cols: u16,
    pub half_rows: u16,
}

impl Pad {
    pub fn contains(&self, col: u16, row: u16) -> bool {
        col.abs_diff(self.center_col) <= self.half_cols
            && row.abs_diff(self.center_row) <= self.half_rows
    }

    fn label(&self) -> &'static str {
        match self.id {
            JoystickId::Steering => "STEERING",
            JoystickId::Throttle => "THROTTLE",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Layout {
    pub cols: u16,
    pub rows: u16,
    cell_width: f64,
    cell_height: f64,
    pads: [Pad; 2],
}

impl Layout {
    pub fn new(cols: u16, rows: u16, config: &TerminalConfig, radius: f64) -> Self {
        // a cell is at least one pixel
        let cell_width = config.cell_width_px.max(1.0);
        let cell_height = config.cell_height_px.max(1.0);
        let half_cols = ((radius / cell_width).ceil() as u16).saturating_add(1);
        let half_rows = ((radius / cell_height).ceil() as u16).saturating_add(1);
        let center_row = rows / 2;
        let pad = |id, center_col| Pad {
            id,
            center_col,
            center_row,
            half_cols,
            half_rows,
        };
        Self {
            cols,
            rows,
            cell_width,
            cell_height,
            pads: [
                pad(JoystickId::Steering, cols / 4),
                pad(JoystickId::Throttle, cols / 4 * 3),
            ],
        }
    }

    pub fn pads(&self) -> &[Pad; 2] {
        &self.pads
    }

    pub fn hit(&self, col: u16, row: u16) -> Option<&Pad> {
        self.pads.iter().find(|pad| pad.contains(col, row))
    }

    /// Pixel position of the middle of a cell.
    pub fn to_px(&self, col: u16, row: u16) -> Point {
        Point::new(
            (col as f64 + 0.5) * self.cell_width,
            (row as f64 + 0.5) * self.cell_height,
        )
    }

    pub fn press(&self, col: u16, row: u16) -> Option<PointerEvent> {
        let pad = self.hit(col, row)?;
        Some(PointerEvent::Down {
            pointer: PointerId::Mouse,
            target: pad.id,
            center: self.to_px(pad.center_col, pad.center_row),
            position: self.to_px(col, row),
        })
    }

    pub fn drag(&self, col: u16, row: u16) -> PointerEvent {
        PointerEvent::Move {
            pointer: PointerId::Mouse,
            position: self.to_px(col, row),
        }
    }

    fn knob_cell(&self, pad: &Pad, knob: Point) -> (u16, u16) {
        let dc = round_half_up(knob.x / self.cell_width) as i32;
        let dr = round_half_up(knob.y / self.cell_height) as i32;
        let dc = dc.clamp(-(pad.half_cols as i32 - 1), pad.half_cols as i32 - 1);
        let dr = dr.clamp(-(pad.half_rows as i32 - 1), pad.half_rows as i32 - 1);
        (
            (pad.center_col as i32 + dc).max(0) as u16,
            (pad.center_row as i32 + dr).max(0) as u16,
        )
    }

    pub fn render(&self, grid: &mut TextGrid, dashboard: &Dashboard) {
        grid.clear();

        let marker = if dashboard.link.is_connected() { '●' } else { '○' };
        grid.write_text(
            0,
            1,
            &format!(
                "{} {}   latency {}",
                marker,
                dashboard.status_text(),
                dashboard.latency_text()
            ),
        );

        let limit = if dashboard.speed_cap {
            dashboard.speed_limit_text()
        } else {
            "off".to_string()
        };
        let signal = dashboard
            .telemetry
            .as_ref()
            .and_then(|t| t.signal_text())
            .unwrap_or_else(|| "--".to_string());
        grid.write_text(
            1,
            1,
            &format!(
                "battery {}   speed {}   signal {}   limit {}",
                dashboard.battery_text(),
                dashboard.speed_text(),
                signal,
                limit
            ),
        );

        for pad in &self.pads {
            grid.draw_box(
                pad.center_row.saturating_sub(pad.half_rows),
                pad.center_col.saturating_sub(pad.half_cols),
                pad.center_row.saturating_add(pad.half_rows),
                pad.center_col.saturating_add(pad.half_cols),
            );
            grid.set_char(pad.center_row, pad.center_col, '+');
            let (col, row) = self.knob_cell(pad, dashboard.knob(pad.id));
            grid.set_char(row, col, 'O');

            let value = match pad.id {
                JoystickId::Steering => dashboard.steering,
                JoystickId::Throttle => dashboard.throttle,
            };
            grid.write_centered(
                pad.center_row.saturating_add(pad.half_rows).saturating_add(1),
                pad.center_col,
                &format!("{} {:+}", pad.label(), value),
            );
        }

        grid.write_text(self.rows.saturating_sub(1), 1, HELP);
    }
}
