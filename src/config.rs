use std::env;

/// Environment variable holding the `host:port` to listen on.
pub const BIND_ENV: &str = "CHESS_ROOMS_BIND";

pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

/// Server settings read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: String,
}

impl ServerConfig {
    pub fn from_env() -> ServerConfig {
        ServerConfig::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ServerConfig {
        let bind_addr = lookup(BIND_ENV)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_BIND.to_string());
        ServerConfig { bind_addr }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_addr: DEFAULT_BIND.to_string(),
        }
    }
}
