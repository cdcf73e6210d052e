//! Configuration module.
//!
//! Loads configuration from environment variables with sensible defaults.

use crate::access::{AllowAll, Authorizer, HostAllowList};

use std::env;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP port for the web server (default: 8080)
    pub http_port: u16,
    /// Path to the JSON status snapshot (default: "status-snapshot.json")
    pub snapshot_path: String,
    /// Ignore soft states unless a request says otherwise (default: false)
    pub hard_states_only: bool,
    /// Hosts the viewer may see; `None` means all of them
    pub authorized_hosts: Option<Vec<String>>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: 8080,
            snapshot_path: "status-snapshot.json".to_string(),
            hard_states_only: false,
            authorized_hosts: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `TACTICAL_HTTP_PORT`: HTTP port (default: 8080)
    /// - `TACTICAL_SNAPSHOT_PATH`: snapshot file path (default: "status-snapshot.json")
    /// - `TACTICAL_HARD_STATES_ONLY`: `true`/`1` to ignore soft states
    /// - `TACTICAL_AUTHORIZED_HOSTS`: comma-separated host names (default: all)
    pub fn load() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(port_str) = get("TACTICAL_HTTP_PORT") {
            if let Ok(port) = port_str.parse() {
                cfg.http_port = port;
            }
        }

        if let Some(path) = get("TACTICAL_SNAPSHOT_PATH") {
            cfg.snapshot_path = path;
        }

        if let Some(flag) = get("TACTICAL_HARD_STATES_ONLY") {
            cfg.hard_states_only = parse_flag(&flag);
        }

        if let Some(list) = get("TACTICAL_AUTHORIZED_HOSTS") {
            let hosts: Vec<String> = list
                .split(',')
                .map(str::trim)
                .filter(|h| !h.is_empty())
                .map(String::from)
                .collect();
            cfg.authorized_hosts = Some(hosts);
        }

        cfg
    }

    /// Build the visibility rule described by this configuration.
    pub fn authorizer(&self) -> Box<dyn Authorizer + Send + Sync> {
        match &self.authorized_hosts {
            Some(hosts) => Box::new(HostAllowList::new(hosts.iter().cloned())),
            None => Box::new(AllowAll),
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
