use std::net::SocketAddr;

use serde::Deserialize;

use parley_core::error::{ParleyError, Result};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub version: u32,

    #[serde(default)]
    pub gateway: GatewaySection,

    #[serde(default)]
    pub relay: RelaySection,
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(ParleyError::Config(format!(
                "unsupported config version {}",
                self.version
            )));
        }
        self.gateway.validate()?;
        self.relay.validate()?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    #[serde(default = "default_listen")]
    pub listen: String,

    /// URL handed out by `/get-ws-endpoint`. Derived from `listen` when unset.
    #[serde(default)]
    pub public_endpoint: Option<String>,

    #[serde(default = "default_ping_interval_ms")]
    pub ping_interval_ms: u64,

    #[serde(default = "default_idle_timeout_ms")]
    pub idle_timeout_ms: u64,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            public_endpoint: None,
            ping_interval_ms: default_ping_interval_ms(),
            idle_timeout_ms: default_idle_timeout_ms(),
        }
    }
}

impl GatewaySection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;
        if let Some(ep) = &self.public_endpoint {
            if !(ep.starts_with("ws://") || ep.starts_with("wss://")) {
                return Err(ParleyError::Config(
                    "gateway.public_endpoint must be a ws:// or wss:// url".into(),
                ));
            }
        }
        if !(5000..=120000).contains(&self.ping_interval_ms) {
            return Err(ParleyError::Config(
                "gateway.ping_interval_ms must be between 5000 and 120000".into(),
            ));
        }
        if !(10000..=600000).contains(&self.idle_timeout_ms) {
            return Err(ParleyError::Config(
                "gateway.idle_timeout_ms must be between 10000 and 600000".into(),
            ));
        }
        if self.idle_timeout_ms <= self.ping_interval_ms {
            return Err(ParleyError::Config(
                "gateway.idle_timeout_ms must be greater than ping_interval_ms".into(),
            ));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen
            .parse()
            .map_err(|e| ParleyError::Config(format!("gateway.listen {:?}: {e}", self.listen)))
    }

    pub fn ws_endpoint(&self) -> String {
        match &self.public_endpoint {
            Some(ep) => ep.clone(),
            None => format!("ws://{}/ws", self.listen),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_ping_interval_ms() -> u64 {
    20000
}
fn default_idle_timeout_ms() -> u64 {
    60000
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelaySection {
    /// Per-connection outbound queue capacity.
    #[serde(default = "default_outbound_queue")]
    pub outbound_queue: usize,

    /// Per-recipient send timeout; 0 waits indefinitely.
    #[serde(default = "default_send_timeout_ms")]
    pub send_timeout_ms: u64,

    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,
}

impl Default for RelaySection {
    fn default() -> Self {
        Self {
            outbound_queue: default_outbound_queue(),
            send_timeout_ms: default_send_timeout_ms(),
            max_frame_bytes: default_max_frame_bytes(),
        }
    }
}

impl RelaySection {
    pub fn validate(&self) -> Result<()> {
        if !(1..=65536).contains(&self.outbound_queue) {
            return Err(ParleyError::Config(
                "relay.outbound_queue must be between 1 and 65536".into(),
            ));
        }
        if self.send_timeout_ms > 60000 {
            return Err(ParleyError::Config(
                "relay.send_timeout_ms must be at most 60000".into(),
            ));
        }
        if self.max_frame_bytes < 64 {
            return Err(ParleyError::Config(
                "relay.max_frame_bytes must be at least 64".into(),
            ));
        }
        Ok(())
    }
}

fn default_outbound_queue() -> usize {
    256
}
fn default_send_timeout_ms() -> u64 {
    1500
}
fn default_max_frame_bytes() -> usize {
    4096
}
