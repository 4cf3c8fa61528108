use crate::backends::{Action, Backend};
use crate::config::TerminalConfig;
use crate::grid::TextGrid;
use crate::layout::Layout;
use anyhow::Result;
use async_trait::async_trait;
use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::{cursor, execute, queue, style, terminal};
use futures_lite::StreamExt;
use rc_link::{Dashboard, PointerEvent, PointerId};
use std::io::{Write, stdout};

/// Full screen remote: the pads are dragged with the mouse.
pub struct TerminalBackend {
    events: EventStream,
    config: TerminalConfig,
    radius: f64,
    layout: Layout,
    grid: TextGrid,
    active: bool,
}

impl TerminalBackend {
    pub fn new(config: TerminalConfig, radius: f64) -> Result<Self> {
        let (cols, rows) = terminal::size()?;
        Ok(Self {
            events: EventStream::new(),
            layout: Layout::new(cols, rows, &config, radius),
            grid: TextGrid::new(rows, cols),
            config,
            radius,
            active: false,
        })
    }

    fn resize(&mut self, cols: u16, rows: u16) {
        self.layout = Layout::new(cols, rows, &self.config, self.radius);
        self.grid.resize(rows, cols);
    }

    fn translate(&mut self, event: Event) -> Option<Action> {
        match event {
            Event::Key(KeyEvent {
                code,
                modifiers,
                kind: KeyEventKind::Press,
                ..
            }) => {
                let step = self.config.speed_limit_step as i16;
                match code {
                    KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                        Some(Action::Quit)
                    }
                    KeyCode::Char(' ') | KeyCode::Char('x') => Some(Action::EmergencyStop),
                    KeyCode::Char('+') | KeyCode::Char('=') => Some(Action::AdjustSpeedLimit(step)),
                    KeyCode::Char('-') => Some(Action::AdjustSpeedLimit(-step)),
                    KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
                    _ => None,
                }
            }
            Event::Mouse(MouseEvent {
                kind, column, row, ..
            }) => match kind {
                MouseEventKind::Down(MouseButton::Left) => {
                    self.layout.press(column, row).map(Action::Pointer)
                }
                MouseEventKind::Drag(MouseButton::Left) => {
                    Some(Action::Pointer(self.layout.drag(column, row)))
                }
                MouseEventKind::Up(MouseButton::Left) => Some(Action::Pointer(PointerEvent::Up {
                    pointer: PointerId::Mouse,
                })),
                _ => None,
            },
            Event::Resize(cols, rows) => {
                self.resize(cols, rows);
                Some(Action::Redraw)
            }
            Event::FocusLost => Some(Action::Pointer(PointerEvent::Cancel {
                pointer: PointerId::Mouse,
            })),
            _ => None,
        }
    }
}

#[async_trait]
impl Backend for TerminalBackend {
    async fn init(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        self.active = true;
        execute!(
            stdout(),
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide
        )?;
        Ok(())
    }

    async fn render(&mut self, dashboard: &Dashboard) -> Result<()> {
        self.layout.render(&mut self.grid, dashboard);

        let mut out = stdout();
        for row in 0..self.grid.rows {
            queue!(
                out,
                cursor::MoveTo(0, row),
                style::Print(self.grid.line_as_str(row))
            )?;
        }
        out.flush()?;
        Ok(())
    }

    async fn next_action(&mut self) -> Result<Action> {
        loop {
            match self.events.next().await {
                Some(Ok(event)) => {
                    if let Some(action) = self.translate(event) {
                        return Ok(action);
                    }
                }
                Some(Err(err)) => return Err(err.into()),
                None => return Ok(Action::Quit),
            }
        }
    }

    async fn cleanup(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        execute!(
            stdout(),
            DisableMouseCapture,
            terminal::LeaveAlternateScreen,
            cursor::Show
        )?;
        terminal::disable_raw_mode()?;
        Ok(())
    }
}

impl Drop for TerminalBackend {
    fn drop(&mut self) {
        // Best effort cleanup
        let _ = futures_lite::future::block_on(self.cleanup());
    }
}
