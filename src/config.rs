use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Env var naming a YAML config file.
pub const CONFIG_ENV: &str = "NETHTTP_CONFIG";
/// Env var overriding `server.port`.
pub const PORT_ENV: &str = "PORT";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
}

/// Listener and per-connection tuning. Every field has a default, so a YAML
/// file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    /// `0` or less asks the kernel for its maximum.
    pub backlog: i32,
    pub recv_timeout_ms: u64,
    pub send_timeout_ms: u64,
    /// A connection that receives nothing for this long is dropped.
    pub idle_timeout_ms: u64,
    /// How often the accept loop wakes to check for shutdown.
    pub accept_timeout_ms: u64,
    pub read_chunk_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 7200,
            backlog: 0,
            recv_timeout_ms: 1000,
            send_timeout_ms: 1000,
            idle_timeout_ms: 30_000,
            accept_timeout_ms: 250,
            read_chunk_size: 4096,
        }
    }
}

impl ServerConfig {
    pub fn recv_timeout(&self) -> Duration {
        Duration::from_millis(self.recv_timeout_ms)
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }

    pub fn accept_timeout(&self) -> Duration {
        Duration::from_millis(self.accept_timeout_ms)
    }

    pub fn validate(&self) -> Result<()> {
        // A zero socket timeout means "block forever", which would stall
        // idle tracking and shutdown.
        if self.recv_timeout_ms == 0 {
            bail!("server.recv_timeout_ms must be positive");
        }
        if self.send_timeout_ms == 0 {
            bail!("server.send_timeout_ms must be positive");
        }
        if self.accept_timeout_ms == 0 {
            bail!("server.accept_timeout_ms must be positive");
        }
        if self.read_chunk_size == 0 {
            bail!("server.read_chunk_size must be positive");
        }
        Ok(())
    }
}

impl Config {
    /// Loads from the file named by `NETHTTP_CONFIG` (defaults when unset),
    /// then applies the `PORT` override.
    pub fn load() -> Result<Self> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// [`Config::load`] with a caller-supplied environment lookup.
    pub fn load_with(env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut cfg = match env(CONFIG_ENV) {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };

        if let Some(port) = env(PORT_ENV) {
            cfg.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("Invalid {} value: {:?}", PORT_ENV, port))?;
        }

        cfg.server.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        let cfg: Config = serde_yaml::from_str(text).context("Failed to parse YAML config")?;
        cfg.server.validate()?;
        Ok(cfg)
    }
}
