//! Server configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use ipnet::IpNet;

/// Default port for the HTTP API.
pub const DEFAULT_PORT: u16 = 8080;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the server to.
    pub bind_address: SocketAddr,

    /// API token. `None` disables authentication.
    pub auth_token: Option<String>,

    /// Networks whose clients skip token authentication.
    pub trusted_networks: Vec<IpNet>,

    /// Enable request logging.
    pub request_logging: bool,

    /// CORS allowed origins (empty = no CORS).
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), DEFAULT_PORT),
            auth_token: None,
            trusted_networks: Vec::new(),
            request_logging: true,
            cors_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Create a new server config with an optional API token.
    /// Pass `None` to disable authentication.
    pub fn new(auth_token: Option<String>) -> Self {
        Self {
            auth_token,
            ..Default::default()
        }
    }

    /// Set the bind address.
    pub fn with_bind_address(mut self, addr: SocketAddr) -> Self {
        self.bind_address = addr;
        self
    }

    /// Set the networks that bypass token authentication.
    pub fn with_trusted_networks(mut self, networks: Vec<IpNet>) -> Self {
        self.trusted_networks = networks;
        self
    }

    /// Enable or disable request logging.
    pub fn with_request_logging(mut self, enabled: bool) -> Self {
        self.request_logging = enabled;
        self
    }

    /// Set CORS allowed origins.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = origins;
        self
    }

    /// Whether protected routes require a token.
    pub fn auth_enabled(&self) -> bool {
        self.auth_token.is_some()
    }

    /// Whether `ip` is loopback or inside a trusted network.
    pub fn is_trusted(&self, ip: IpAddr) -> bool {
        ip.is_loopback() || self.trusted_networks.iter().any(|net| net.contains(&ip))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_address.port(), DEFAULT_PORT);
        assert!(!config.auth_enabled());
        assert!(config.request_logging);
        assert!(config.trusted_networks.is_empty());
    }

    #[test]
    fn test_loopback_always_trusted() {
        let config = ServerConfig::new(Some("t".to_string()));
        assert!(config.is_trusted("127.0.0.1".parse().unwrap()));
        assert!(config.is_trusted("::1".parse().unwrap()));
        assert!(!config.is_trusted("10.1.2.3".parse().unwrap()));
    }

    #[test]
    fn test_trusted_networks() {
        let config = ServerConfig::new(Some("t".to_string()))
            .with_trusted_networks(vec!["10.0.0.0/8".parse().unwrap()]);
        assert!(config.is_trusted("10.1.2.3".parse().unwrap()));
        assert!(!config.is_trusted("192.168.1.1".parse().unwrap()));
        assert!(!config.is_trusted("8.8.8.8".parse().unwrap()));
    }
}
