use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use rc_link::sim::{self, Vehicle};
use rc_link::{HttpTransport, Session};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

mod backends;
mod config;
mod grid;
mod layout;

use backends::{Action, Backend, HeadlessBackend, TerminalBackend};
use config::Config;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Remote control for a small wheeled vehicle over HTTP",
    long_about = None
)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "rc-remote.toml")]
    config: String,

    #[arg(long, value_enum, default_value = "info")]
    log_level: LogLevel,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Drive the vehicle")]
    Drive(DriveArgs),
    #[command(about = "Run a simulated vehicle")]
    Sim(SimArgs),
}

#[derive(clap::Args, Debug)]
struct DriveArgs {
    /// Vehicle base url (overrides config)
    #[arg(short, long)]
    url: Option<String>,

    #[arg(short, long, value_enum, default_value = "terminal")]
    mode: Mode,

    /// Initial speed limit in percent (overrides config)
    #[arg(long)]
    speed_limit: Option<u8>,
}

#[derive(clap::Args, Debug)]
struct SimArgs {
    /// Address to serve the vehicle on (overrides config)
    #[arg(short, long)]
    addr: Option<SocketAddr>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Full screen terminal with mouse driven pads
    Terminal,
    /// No input, log link and telemetry changes
    Headless,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

fn init_tracing(cli: &Cli) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::builder().from_env_lossy()
    } else {
        let level = cli.log_level.as_str();
        EnvFilter::builder().parse_lossy(format!("rc_remote={level},rc_link={level}"))
    };

    // the terminal front end owns the screen, so its logs go to a file or nowhere
    let drives_terminal = matches!(
        &cli.command,
        Commands::Drive(DriveArgs {
            mode: Mode::Terminal,
            ..
        })
    );
    let (writer, ansi) = match &cli.log_file {
        Some(path) => (
            BoxMakeWriter::new(Mutex::new(std::fs::File::create(path)?)),
            false,
        ),
        None if drives_terminal => (BoxMakeWriter::new(std::io::sink), false),
        None => (BoxMakeWriter::new(std::io::stderr), true),
    };

    let _ = tracing_subscriber::fmt::fmt()
        .with_target(false)
        .with_env_filter(filter)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::new(
            "%Y-%m-%d %H:%M:%S%.3f".to_string(),
        ))
        .with_ansi(ansi)
        .with_writer(writer)
        .try_init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli)?;

    let config = Config::from_file_or_default(&cli.config)?;
    match cli.command {
        Commands::Drive(args) => drive(config, args).await,
        Commands::Sim(args) => simulate(config, args).await,
    }
}

async fn drive(mut config: Config, args: DriveArgs) -> Result<()> {
    if let Some(url) = args.url {
        config.session.url = url;
    }
    if let Some(speed_limit) = args.speed_limit {
        config.session.speed_limit = speed_limit;
    }

    let radius = config.session.joystick_radius;
    let transport = HttpTransport::new(&config.session)?;
    let session = Session::new(config.session, Arc::new(transport));

    let backend: Box<dyn Backend> = match args.mode {
        Mode::Terminal => Box::new(TerminalBackend::new(config.terminal.clone(), radius)?),
        Mode::Headless => {
            info!("Starting in headless mode");
            Box::new(HeadlessBackend::new())
        }
    };

    session.start();
    let result = run_remote_loop(&session, backend, config.terminal.refresh_rate_hz).await;
    session.dispose();
    result
}

async fn simulate(mut config: Config, args: SimArgs) -> Result<()> {
    if let Some(addr) = args.addr {
        config.sim.addr = addr;
    }
    let listener = tokio::net::TcpListener::bind(config.sim.addr).await?;
    let vehicle = Vehicle::new(config.sim);
    tokio::select! {
        res = sim::serve(listener, vehicle) => res?,
        _ = tokio::signal::ctrl_c() => info!("Simulated vehicle stopped"),
    }
    Ok(())
}

async fn run_remote_loop(
    session: &Session,
    mut backend: Box<dyn Backend>,
    refresh_rate_hz: f32,
) -> Result<()> {
    let frame_period = Duration::from_secs_f32(1.0 / refresh_rate_hz.max(1.0));
    let mut frames = tokio::time::interval(frame_period);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut dashboard = session.dashboard();
    let mut dirty = true;

    backend.init().await?;
    let result = loop {
        tokio::select! {
            _ = frames.tick() => {
                if !dirty {
                    continue;
                }
                dirty = false;
                let snapshot = dashboard.borrow_and_update().clone();
                if let Err(err) = backend.render(&snapshot).await {
                    break Err(err);
                }
            }
            changed = dashboard.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
                dirty = true;
            }
            action = backend.next_action() => match action {
                Ok(Action::Quit) => break Ok(()),
                Ok(action) => {
                    apply(session, action);
                    dirty = true;
                }
                Err(err) => break Err(err),
            },
            _ = tokio::signal::ctrl_c() => break Ok(()),
        }
    };
    backend.cleanup().await?;
    result
}

fn apply(session: &Session, action: Action) {
    match action {
        Action::Pointer(event) => session.input(event),
        Action::EmergencyStop => {
            let _ = session.emergency_stop();
        }
        Action::AdjustSpeedLimit(delta) => {
            let limit = (session.speed_limit() as i16 + delta).clamp(0, 100) as u8;
            session.set_speed_limit(limit);
        }
        Action::Redraw | Action::Quit => {}
    }
}
