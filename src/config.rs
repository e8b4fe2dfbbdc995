use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use crate::escalation::DEFAULT_MONITOR_INTERVAL_SECS;
use crate::models::PriorityLevel;

/// Application-level constants
pub const APP_NAME: &str = "CareQueue";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";
pub const DEFAULT_ENRICHMENT_MODEL: &str = "llama3.2";
pub const DEFAULT_ENRICHMENT_TIMEOUT_SECS: u64 = 20;

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "info,carequeue=debug,tower_http=info"
}

/// Runtime configuration for the queue server.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub bind: IpAddr,
    pub port: u16,
    /// Whether an LLM enricher is wired in at all.
    pub enrichment_enabled: bool,
    pub ollama_host: String,
    pub enrichment_model: String,
    pub enrichment_timeout: Duration,
    pub monitor_interval: Duration,
    /// Least urgent priority the escalation policy treats as an emergency.
    pub escalation_max_priority: PriorityLevel,
    /// Load the demo hospitals and queue at startup.
    pub seed_demo: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            enrichment_enabled: false,
            ollama_host: DEFAULT_OLLAMA_HOST.to_string(),
            enrichment_model: DEFAULT_ENRICHMENT_MODEL.to_string(),
            enrichment_timeout: Duration::from_secs(DEFAULT_ENRICHMENT_TIMEOUT_SECS),
            monitor_interval: Duration::from_secs(DEFAULT_MONITOR_INTERVAL_SECS),
            escalation_max_priority: PriorityLevel::Urgent,
            seed_demo: true,
        }
    }
}

impl ServiceConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unparseable values keep the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(n) = lookup("CAREQUEUE_PORT").and_then(|v| v.parse().ok()) {
            config.port = n;
        }
        if let Some(ip) = lookup("CAREQUEUE_BIND").and_then(|v| v.parse().ok()) {
            config.bind = ip;
        }
        if let Some(flag) = lookup("CAREQUEUE_ENRICHMENT").and_then(|v| parse_flag(&v)) {
            config.enrichment_enabled = flag;
        }
        if let Some(host) = lookup("OLLAMA_HOST").filter(|v| !v.trim().is_empty()) {
            config.ollama_host = normalize_host(&host);
        }
        if let Some(model) = lookup("CAREQUEUE_ENRICHMENT_MODEL").filter(|v| !v.trim().is_empty()) {
            config.enrichment_model = model;
        }
        if let Some(secs) = lookup("CAREQUEUE_ENRICHMENT_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            config.enrichment_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = lookup("CAREQUEUE_MONITOR_INTERVAL_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|&s| s > 0)
        {
            config.monitor_interval = Duration::from_secs(secs);
        }
        if let Some(level) = lookup("CAREQUEUE_ESCALATION_MAX_PRIORITY")
            .and_then(|v| v.trim().parse::<u8>().ok())
            .and_then(|n| PriorityLevel::try_from(n).ok())
        {
            config.escalation_max_priority = level;
        }
        if let Some(flag) = lookup("CAREQUEUE_SEED_DEMO").and_then(|v| parse_flag(&v)) {
            config.seed_demo = flag;
        }

        config
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// `OLLAMA_HOST` is commonly given as `host:port` without a scheme.
fn normalize_host(host: &str) -> String {
    let host = host.trim();
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{host}")
    }
}
