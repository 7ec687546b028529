//! Client for the Roku External Control Protocol (ECP).
//!
//! ECP is plain HTTP on port 8060: `GET /query/*` for device state and
//! `POST /keypress/*`, `POST /launch/*` for control.

pub mod client;
pub mod keys;
pub mod xml;

use async_trait::async_trait;

pub use client::EcpClient;
pub use keys::EcpKey;
pub use xml::{ActiveApp, AppEntry};

pub const ECP_PORT: u16 = 8060;

#[derive(Debug, thiserror::Error)]
pub enum EcpError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("HTTP {0}")]
    Status(u16),
    #[error("malformed ECP response: {0}")]
    Xml(#[from] quick_xml::de::DeError),
}

/// Read-only device queries.
#[async_trait]
pub trait DeviceQuery: Send + Sync {
    async fn active_app(&self, ip: &str) -> Result<ActiveApp, EcpError>;
    async fn apps(&self, ip: &str) -> Result<Vec<AppEntry>, EcpError>;
}

/// Raw icon bytes for an app.
#[async_trait]
pub trait IconSource: Send + Sync {
    async fn icon(&self, ip: &str, app_id: &str) -> Result<Vec<u8>, EcpError>;
}
