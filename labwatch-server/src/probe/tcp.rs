use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tracing::debug;

use super::Prober;

/// Reachability probe that attempts a TCP connect.
///
/// An address may carry its own port (`"host:port"`); bare addresses get
/// the configured default port appended.
pub struct TcpProber {
    port: u16,
    timeout: Duration,
}

impl TcpProber {
    pub fn new(port: u16, timeout: Duration) -> Self {
        Self { port, timeout }
    }

    fn target(&self, addr: &str) -> String {
        if addr.parse::<SocketAddr>().is_ok() {
            addr.to_owned()
        } else {
            format!("{}:{}", addr, self.port)
        }
    }
}

#[async_trait]
impl Prober for TcpProber {
    async fn probe(&self, addr: &str) -> bool {
        let target = self.target(addr);

        match tokio::time::timeout(self.timeout, TcpStream::connect(&target)).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                debug!(addr = %target, error = ?e, "Probe connect failed");
                false
            }
            Err(_) => {
                debug!(addr = %target, "Probe timed out");
                false
            }
        }
    }
}
