use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid vehicle url {url}: {reason}")]
    #[diagnostic(help("the url must be absolute, e.g. http://192.168.4.1"))]
    InvalidUrl { url: String, reason: String },
    #[error("malformed telemetry: {0}")]
    Telemetry(#[from] serde_json::Error),
    #[error("empty command payload")]
    EmptyCommand,
    #[error("unknown command tag {0:#04x}")]
    UnknownCommand(u8),
    #[error("motor command truncated: expected 4 bytes, got {0}")]
    TruncatedCommand(usize),
    #[error("command checksum mismatch: expected {expected:#04x}, got {actual:#04x}")]
    ChecksumMismatch { expected: u8, actual: u8 },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid session config: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
