//! A driving session: input handling plus the three polling loops.
//!
//! | loop      | default period | request             | on failure            |
//! |-----------|----------------|---------------------|-----------------------|
//! | send      | 20 ms          | `POST /command`     | link drops            |
//! | telemetry | 100 ms         | `GET /telemetry`    | logged                |
//! | ping      | 1000 ms        | `GET /telemetry`    | link drops            |
//!
//! Every tick spawns its request and moves on, so a slow vehicle sees overlapping
//! requests rather than a stalled loop. A ping that succeeds while the link is down
//! marks it connected and restarts the send and telemetry loops.
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicI8, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, error, info, warn};

use crate::command::{Command, MotorCommand, SPEED_LIMIT_MAX};
use crate::config::SessionConfig;
use crate::dashboard::Dashboard;
use crate::input::{AxisUpdate, JoystickId, JoystickPad, PointerEvent};
use crate::link::{Link, LinkState};
use crate::transport::Transport;

pub struct Session {
    shared: Arc<Shared>,
}

struct Shared {
    config: SessionConfig,
    transport: Arc<dyn Transport>,
    steering: AtomicI8,
    throttle: AtomicI8,
    speed_limit: AtomicU8,
    link: Link,
    running: AtomicBool,
    pad: Mutex<JoystickPad>,
    dashboard: watch::Sender<Dashboard>,
    loops: Mutex<Loops>,
}

#[derive(Default)]
struct Loops {
    send: Option<JoinHandle<()>>,
    telemetry: Option<JoinHandle<()>>,
    ping: Option<JoinHandle<()>>,
}

impl Loops {
    fn abort_all(&mut self) {
        for handle in [self.send.take(), self.telemetry.take(), self.ping.take()]
            .into_iter()
            .flatten()
        {
            handle.abort();
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Session {
    pub fn new(config: SessionConfig, transport: Arc<dyn Transport>) -> Self {
        let speed_limit = config.initial_speed_limit();
        let (dashboard, _) = watch::channel(Dashboard {
            speed_limit,
            speed_cap: config.speed_cap,
            ..Default::default()
        });
        Self {
            shared: Arc::new(Shared {
                pad: Mutex::new(JoystickPad::new(config.joystick_radius)),
                config,
                transport,
                steering: AtomicI8::new(0),
                throttle: AtomicI8::new(0),
                speed_limit: AtomicU8::new(speed_limit),
                link: Link::default(),
                running: AtomicBool::new(false),
                dashboard,
                loops: Mutex::new(Loops::default()),
            }),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.shared.config
    }

    /// Spawns the send, telemetry and ping loops. The link starts disconnected
    /// and comes up with the first successful ping.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) {
        if self.shared.running.swap(true, Ordering::AcqRel) {
            return;
        }
        info!(url = %self.shared.config.url, "starting session");
        self.shared.link.reset();
        self.shared
            .dashboard
            .send_modify(Dashboard::set_disconnected);
        let mut loops = lock(&self.shared.loops);
        loops.ping = Some(tokio::spawn(ping_loop(self.shared.clone())));
        drop(loops);
        self.shared.restart_links();
    }

    /// Cancels all loops. Responses still in flight are ignored.
    pub fn stop(&self) {
        if !self.shared.running.swap(false, Ordering::AcqRel) {
            return;
        }
        info!("stopping session");
        lock(&self.shared.loops).abort_all();
    }

    pub fn dispose(self) {
        self.stop();
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    pub fn link_state(&self) -> LinkState {
        self.shared.link.state()
    }

    pub fn dashboard(&self) -> watch::Receiver<Dashboard> {
        self.shared.dashboard.subscribe()
    }

    pub fn axes(&self) -> (i8, i8) {
        (
            self.shared.steering.load(Ordering::Acquire),
            self.shared.throttle.load(Ordering::Acquire),
        )
    }

    pub fn speed_limit(&self) -> u8 {
        self.shared.speed_limit.load(Ordering::Acquire)
    }

    /// Sets the speed limit, clamped to [0, 100].
    pub fn set_speed_limit(&self, percent: u8) {
        let percent = percent.min(SPEED_LIMIT_MAX);
        self.shared.speed_limit.store(percent, Ordering::Release);
        self.shared
            .dashboard
            .send_modify(|dashboard| dashboard.speed_limit = percent);
    }

    /// The command the next send tick would transmit.
    pub fn motor_command(&self) -> MotorCommand {
        self.shared.motor_command()
    }

    pub fn input(&self, event: PointerEvent) {
        let updates = lock(&self.shared.pad).handle(event);
        for update in &updates {
            self.shared.apply(update);
        }
    }

    /// Zeroes both axes and knobs, then posts the stop payload whatever the link
    /// state.
    ///
    /// Must be called from within a tokio runtime.
    pub fn emergency_stop(&self) -> JoinHandle<()> {
        warn!("emergency stop");
        let updates = lock(&self.shared.pad).recenter();
        for update in &updates {
            self.shared.apply(update);
        }
        let transport = self.shared.transport.clone();
        tokio::spawn(async move {
            if let Err(err) = transport.send_command(Command::EmergencyStop.encode()).await {
                error!(?err, "emergency stop failed");
            }
        })
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.stop();
    }
}

impl Shared {
    fn motor_command(&self) -> MotorCommand {
        let motor = MotorCommand::new(
            self.throttle.load(Ordering::Acquire),
            self.steering.load(Ordering::Acquire),
        );
        if self.config.speed_cap {
            motor.limited(self.speed_limit.load(Ordering::Acquire))
        } else {
            motor
        }
    }

    fn apply(&self, update: &AxisUpdate) {
        let axis = match update.joystick {
            JoystickId::Steering => &self.steering,
            JoystickId::Throttle => &self.throttle,
        };
        axis.store(update.deflection.value, Ordering::Release);
        self.dashboard.send_modify(|dashboard| dashboard.apply(update));
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    fn restart_links(self: &Arc<Self>) {
        let mut loops = lock(&self.loops);
        // stop() may have run since the caller checked
        if !self.is_running() {
            return;
        }
        for handle in [loops.send.take(), loops.telemetry.take()]
            .into_iter()
            .flatten()
        {
            handle.abort();
        }
        loops.send = Some(tokio::spawn(send_loop(self.clone())));
        loops.telemetry = Some(tokio::spawn(telemetry_loop(self.clone())));
    }

    fn connected(self: &Arc<Self>, latency: Duration) {
        if !self.is_running() {
            return;
        }
        let reconnected = self.link.ping_succeeded();
        self.dashboard.send_modify(|dashboard| {
            dashboard.link = LinkState::Connected;
            dashboard.latency = Some(latency);
        });
        if reconnected {
            info!(?latency, "link up");
            self.restart_links();
        }
    }

    fn disconnected(&self) {
        if !self.is_running() {
            return;
        }
        if self.link.failed() {
            warn!("link down");
        }
        self.dashboard.send_modify(Dashboard::set_disconnected);
    }
}

/// Calls `tick` every `period`, first after one full period.
async fn every<F, Fut>(period: Duration, mut tick: F)
where
    F: FnMut() -> Option<Fut>,
    Fut: Future<Output = ()> + Send + 'static,
{
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        interval.tick().await;
        if let Some(request) = tick() {
            tokio::spawn(request);
        }
    }
}

async fn send_loop(shared: Arc<Shared>) {
    let period = shared.config.send_period();
    every(period, || {
        if !shared.link.is_connected() && !shared.config.transmit_while_disconnected {
            return None;
        }
        let payload = Command::Motor(shared.motor_command()).encode();
        let shared = shared.clone();
        Some(async move {
            if let Err(err) = shared.transport.send_command(payload).await {
                warn!(?err, "command send failed");
                shared.disconnected();
            }
        })
    })
    .await
}

async fn telemetry_loop(shared: Arc<Shared>) {
    let period = shared.config.telemetry_period();
    every(period, || {
        let shared = shared.clone();
        Some(async move {
            match shared.transport.fetch_telemetry().await {
                Ok(telemetry) if shared.is_running() => {
                    shared
                        .dashboard
                        .send_modify(|dashboard| dashboard.telemetry = Some(telemetry));
                }
                Ok(_) => {}
                Err(err) => warn!(?err, "telemetry fetch failed"),
            }
        })
    })
    .await
}

async fn ping_loop(shared: Arc<Shared>) {
    let period = shared.config.ping_period();
    every(period, || {
        let shared = shared.clone();
        Some(async move {
            let sent = Instant::now();
            match shared.transport.ping().await {
                Ok(()) => {
                    let latency = sent.elapsed();
                    debug!(?latency, "ping");
                    shared.connected(latency);
                }
                Err(err) => {
                    warn!(?err, "ping failed");
                    shared.disconnected();
                }
            }
        })
    })
    .await
}
