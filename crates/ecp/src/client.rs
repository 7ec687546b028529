use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::xml::{parse_active_app, parse_apps, ActiveApp, AppEntry};
use crate::{DeviceQuery, EcpError, EcpKey, IconSource, ECP_PORT};

const QUERY_TIMEOUT: Duration = Duration::from_secs(3);
const CONTROL_TIMEOUT: Duration = Duration::from_secs(10);

/// Stateless ECP client. Each call targets the device at `ip`.
#[derive(Debug, Clone)]
pub struct EcpClient {
    http: reqwest::Client,
    port: u16,
    query_timeout: Duration,
    control_timeout: Duration,
}

impl EcpClient {
    pub fn new() -> Result<Self, EcpError> {
        let http = reqwest::Client::builder()
            .user_agent("roku-remote/0.1 (ECP)")
            .build()?;
        Ok(Self {
            http,
            port: ECP_PORT,
            query_timeout: QUERY_TIMEOUT,
            control_timeout: CONTROL_TIMEOUT,
        })
    }

    pub fn with_timeouts(mut self, query: Duration, control: Duration) -> Self {
        self.query_timeout = query;
        self.control_timeout = control;
        self
    }

    #[cfg(test)]
    fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    fn base_url(&self, ip: &str) -> String {
        format!("http://{ip}:{}", self.port)
    }

    /// `POST /keypress/<key>`. Sent once, never retried.
    pub async fn keypress(&self, ip: &str, key: EcpKey) -> Result<(), EcpError> {
        let url = format!("{}/keypress/{}", self.base_url(ip), key.as_str());
        match self.post(&url).await {
            Ok(()) => {
                info!(%ip, %key, "sent keypress");
                Ok(())
            }
            Err(e) => {
                warn!(%ip, %key, error = %e, "keypress failed");
                Err(e)
            }
        }
    }

    /// `POST /launch/<app_id>`.
    pub async fn launch(&self, ip: &str, app_id: &str) -> Result<(), EcpError> {
        let url = format!("{}/launch/{}", self.base_url(ip), app_id);
        match self.post(&url).await {
            Ok(()) => {
                info!(%ip, app_id, "launched app");
                Ok(())
            }
            Err(e) => {
                warn!(%ip, app_id, error = %e, "launch failed");
                Err(e)
            }
        }
    }

    async fn post(&self, url: &str) -> Result<(), EcpError> {
        let resp = self
            .http
            .post(url)
            .timeout(self.control_timeout)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(EcpError::Status(status.as_u16()));
        }
        Ok(())
    }

    async fn get_text(&self, url: &str) -> Result<String, EcpError> {
        debug!(url, "ECP query");
        let resp = self
            .http
            .get(url)
            .timeout(self.query_timeout)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(EcpError::Status(status.as_u16()));
        }
        Ok(resp.text().await?)
    }
}

#[async_trait]
impl DeviceQuery for EcpClient {
    async fn active_app(&self, ip: &str) -> Result<ActiveApp, EcpError> {
        let body = self
            .get_text(&format!("{}/query/active-app", self.base_url(ip)))
            .await?;
        Ok(parse_active_app(&body)?)
    }

    async fn apps(&self, ip: &str) -> Result<Vec<AppEntry>, EcpError> {
        let body = self.get_text(&format!("{}/query/apps", self.base_url(ip))).await?;
        Ok(parse_apps(&body)?)
    }
}

#[async_trait]
impl IconSource for EcpClient {
    async fn icon(&self, ip: &str, app_id: &str) -> Result<Vec<u8>, EcpError> {
        let url = format!("{}/query/icon/{}", self.base_url(ip), app_id);
        info!(%url, "fetching icon");
        let resp = self
            .http
            .get(&url)
            .timeout(self.control_timeout)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(EcpError::Status(status.as_u16()));
        }
        Ok(resp.bytes().await?.to_vec())
    }
}
