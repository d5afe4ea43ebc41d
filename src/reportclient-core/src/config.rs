use serde::{Deserialize, Serialize};
use std::time::Duration;

/// API version sent as `ZOHO_API_VERSION` on every request
pub const API_VERSION: &str = "1.0";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
    /// Base request URL; resource URIs are built on top of it
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Long-lived token passed as `authtoken` with every request
    #[serde(default)]
    pub authtoken: String,

    #[serde(default)]
    pub proxy: Option<ProxyConfig>,

    /// Seconds allowed to establish a connection
    #[serde(default)]
    pub connection_timeout_secs: Option<u64>,

    /// Seconds allowed for the whole request including the response body
    #[serde(default)]
    pub read_timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    "https://reportsapi.zoho.com/api/".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ProxyConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub kind: ProxyKind,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl ProxyConfig {
    /// Proxy address in `http://host:port` form
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// Which outgoing schemes go through the proxy
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProxyKind {
    Http,
    Https,
    #[default]
    Both,
}

impl ClientConfig {
    pub fn new(authtoken: impl Into<String>) -> Self {
        Self {
            authtoken: authtoken.into(),
            ..Self::default()
        }
    }

    pub fn load(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: ClientConfig = serde_json::from_str(&contents)?;
        Ok(config)
    }

    pub fn connection_timeout(&self) -> Option<Duration> {
        self.connection_timeout_secs.map(Duration::from_secs)
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_secs.map(Duration::from_secs)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            authtoken: String::new(),
            proxy: None,
            connection_timeout_secs: None,
            read_timeout_secs: None,
        }
    }
}
