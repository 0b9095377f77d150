use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub registry: RegistryConfig,
    pub reconciler: ReconcilerConfig,
    pub prober: ProberConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Address for the HTTP server to listen on
    pub listen_addr: SocketAddr,
    /// Directory holding the console's static assets
    pub static_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RegistryConfig {
    Memory,
    Sqlite { path: PathBuf },
}

#[derive(Debug, Deserialize)]
pub struct ReconcilerConfig {
    /// Interval in seconds between reconciliation passes
    pub interval_secs: u64,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProberConfig {
    Tcp {
        /// Port probed on addresses that don't carry their own
        port: u16,
        /// Per-probe connect timeout in milliseconds
        timeout_ms: u64,
    },
    Mock {
        /// Answer returned for every probe
        alive: bool,
    },
}

#[derive(Debug, Deserialize)]
pub struct AuthConfig {
    /// Account created at startup when no users exist
    pub bootstrap_user: String,
    pub bootstrap_password: String,
}

impl Config {
    pub fn load(path: &Path) -> color_eyre::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                listen_addr: "0.0.0.0:3000".parse().unwrap(),
                static_dir: PathBuf::from("public"),
            },
            registry: RegistryConfig::Memory,
            reconciler: ReconcilerConfig { interval_secs: 15 },
            prober: ProberConfig::Tcp {
                port: 22,
                timeout_ms: 2000,
            },
            auth: AuthConfig {
                bootstrap_user: "user".to_string(),
                bootstrap_password: "user".to_string(),
            },
        }
    }
}
