//! HTTP access to the vehicle.
use async_trait::async_trait;
use reqwest::Url;
use reqwest::header::CONTENT_TYPE;
use tracing::trace;

use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::telemetry::Telemetry;

pub const TELEMETRY_PATH: &str = "telemetry";
pub const COMMAND_PATH: &str = "command";
pub const OCTET_STREAM: &str = "application/octet-stream";

/// The requests a session issues. Non-success statuses are errors.
#[async_trait]
pub trait Transport: Send + Sync {
    /// `GET /telemetry`, parsed.
    async fn fetch_telemetry(&self) -> Result<Telemetry>;

    /// `GET /telemetry`, body ignored.
    async fn ping(&self) -> Result<()>;

    /// `POST /command` with an octet-stream body.
    async fn send_command(&self, payload: Vec<u8>) -> Result<()>;
}

pub struct HttpTransport {
    client: reqwest::Client,
    telemetry_url: Url,
    command_url: Url,
}

impl HttpTransport {
    pub fn new(config: &SessionConfig) -> Result<Self> {
        let invalid = |reason: String| Error::InvalidUrl {
            url: config.url.clone(),
            reason,
        };
        let mut base = Url::parse(&config.url).map_err(|err| invalid(err.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(invalid("not a base url".to_string()));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let join = |path: &str| base.join(path).map_err(|err| invalid(err.to_string()));

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            telemetry_url: join(TELEMETRY_PATH)?,
            command_url: join(COMMAND_PATH)?,
        })
    }

    pub fn telemetry_url(&self) -> &Url {
        &self.telemetry_url
    }

    pub fn command_url(&self) -> &Url {
        &self.command_url
    }

    async fn get_telemetry(&self) -> Result<reqwest::Response> {
        let response = self.client.get(self.telemetry_url.clone()).send().await?;
        Ok(response.error_for_status()?)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch_telemetry(&self) -> Result<Telemetry> {
        let body = self.get_telemetry().await?.bytes().await?;
        Telemetry::from_json(&body)
    }

    async fn ping(&self) -> Result<()> {
        self.get_telemetry().await?;
        Ok(())
    }

    async fn send_command(&self, payload: Vec<u8>) -> Result<()> {
        trace!(?payload, "posting command");
        self.client
            .post(self.command_url.clone())
            .header(CONTENT_TYPE, OCTET_STREAM)
            .body(payload)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport(url: &str) -> Result<HttpTransport> {
        HttpTransport::new(&SessionConfig {
            url: url.to_string(),
            ..Default::default()
        })
    }

    #[test]
    fn test_endpoint_urls() {
        let http = transport("http://192.168.4.1").unwrap();
        assert_eq!(http.telemetry_url().as_str(), "http://192.168.4.1/telemetry");
        assert_eq!(http.command_url().as_str(), "http://192.168.4.1/command");

        let http = transport("http://rover.local:8080/api").unwrap();
        assert_eq!(http.command_url().as_str(), "http://rover.local:8080/api/command");
    }

    #[test]
    fn test_invalid_url() {
        assert!(matches!(transport("192.168.4.1"), Err(Error::InvalidUrl { .. })));
        assert!(matches!(transport("mailto:rover@local"), Err(Error::InvalidUrl { .. })));
    }
}
