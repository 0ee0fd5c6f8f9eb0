//! Server configuration
//!
//! Defaults plus the single optional positional port argument.

use std::time::Duration;

use crate::error::AppError;

/// Default listening port
pub const DEFAULT_PORT: u16 = 8989;

/// Default maximum number of registered participants
pub const DEFAULT_MAX_CLIENTS: usize = 10;

/// Server configuration structure
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_clients: usize,
    /// Oldest entries are evicted past this many; `None` keeps everything
    pub history_limit: Option<usize>,
    /// Longest a session may wait for its next line; `None` waits forever
    pub idle_timeout: Option<Duration>,
    /// Longest a single socket write may stall before the peer is dropped
    pub write_timeout: Duration,
    /// Longer inbound lines are skipped and rejected in-band
    pub max_line_length: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            max_clients: DEFAULT_MAX_CLIENTS,
            history_limit: None,
            idle_timeout: None,
            write_timeout: Duration::from_secs(10),
            max_line_length: 64 * 1024,
        }
    }
}

impl ServerConfig {
    /// Build a config from the process arguments following the program name
    ///
    /// Accepts at most one argument, the port.
    pub fn from_args<I>(args: I) -> Result<Self, AppError>
    where
        I: IntoIterator<Item = String>,
    {
        let args: Vec<String> = args.into_iter().collect();
        let mut config = Self::default();

        match args.as_slice() {
            [] => {}
            [port] => {
                config.port = port
                    .parse()
                    .map_err(|_| AppError::InvalidPort(port.clone()))?;
            }
            _ => return Err(AppError::Usage),
        }

        Ok(config)
    }

    /// Address string suitable for `TcpListener::bind`
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_defaults_without_args() {
        let config = ServerConfig::from_args(args(&[])).unwrap();
        assert_eq!(config.port, 8989);
        assert_eq!(config.max_clients, 10);
        assert!(config.history_limit.is_none());
        assert!(config.idle_timeout.is_none());
        assert_eq!(config.bind_addr(), "0.0.0.0:8989");
    }

    #[test]
    fn test_port_argument() {
        let config = ServerConfig::from_args(args(&["2525"])).unwrap();
        assert_eq!(config.port, 2525);
    }

    #[test]
    fn test_invalid_port() {
        let err = ServerConfig::from_args(args(&["chat"])).unwrap_err();
        assert!(matches!(err, AppError::InvalidPort(p) if p == "chat"));

        let err = ServerConfig::from_args(args(&["70000"])).unwrap_err();
        assert!(matches!(err, AppError::InvalidPort(_)));
    }

    #[test]
    fn test_too_many_args_is_usage_error() {
        let err = ServerConfig::from_args(args(&["8989", "extra"])).unwrap_err();
        assert!(matches!(err, AppError::Usage));
        assert_eq!(err.to_string(), "[USAGE]: ./TCPChat $port");
    }
}
