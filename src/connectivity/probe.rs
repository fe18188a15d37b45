//! TCP reachability probe
//!
//! Stands in for the device's network signals when running outside a
//! browser: it periodically opens a TCP connection to the endpoint host and
//! reports changes to a running feed.

use crate::error::{Error, Result};
use crate::runtime::FeedHandle;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tracing::debug;
use url::Url;

/// Periodic reachability check against one host
#[derive(Debug, Clone)]
pub struct TcpProbe {
    addr: String,
    interval: Duration,
    timeout: Duration,
}

impl TcpProbe {
    /// Create a probe for a `host:port` address
    pub fn new(addr: impl Into<String>, interval: Duration) -> Self {
        Self {
            addr: addr.into(),
            interval,
            timeout: Duration::from_secs(2),
        }
    }

    /// Create a probe for the host of a URL
    pub fn for_url(url: &str, interval: Duration) -> Result<Self> {
        let url = Url::parse(url)?;
        let host = url
            .host_str()
            .ok_or_else(|| Error::config(format!("URL '{url}' has no host")))?;
        let port = url
            .port_or_known_default()
            .ok_or_else(|| Error::config(format!("URL '{url}' has no port")))?;
        Ok(Self::new(format!("{host}:{port}"), interval))
    }

    /// Set the connect deadline
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Probed address
    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Check reachability once
    pub async fn check(&self) -> bool {
        matches!(
            tokio::time::timeout(self.timeout, TcpStream::connect(&self.addr)).await,
            Ok(Ok(_))
        )
    }

    /// Probe forever, reporting changes until the feed is torn down
    pub fn spawn(self, feed: FeedHandle) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut last = None;
            loop {
                let online = self.check().await;
                if last != Some(online) {
                    debug!("Probe {} reachable: {}", self.addr, online);
                    if feed.set_online(online).is_err() {
                        break;
                    }
                    last = Some(online);
                }
                tokio::time::sleep(self.interval).await;
            }
        })
    }
}
