//! Resolved development server configuration.

use crate::config::NobuConfig;
use crate::error::{ConfigError, Result};
use std::net::{IpAddr, SocketAddr};

/// How many ports above the requested one are tried.
const PORT_FALLBACK_RANGE: u16 = 10;

/// Configuration with the socket address settled.
#[derive(Debug, Clone)]
pub struct DevConfig {
    /// Validated configuration
    pub base: NobuConfig,
    /// Address the server binds to
    pub addr: SocketAddr,
}

impl DevConfig {
    /// Resolve the bind address, falling back to a nearby free port.
    ///
    /// # Errors
    ///
    /// Returns an error if `host` is not an IP address or no port in the
    /// fallback range can be bound.
    pub fn from_config(base: NobuConfig) -> Result<Self> {
        let ip: IpAddr = base.host.parse().map_err(|_| ConfigError::InvalidValue {
            field: "host".to_string(),
            value: base.host.clone(),
            hint: "Use an IP address such as 127.0.0.1 or 0.0.0.0".to_string(),
        })?;

        let addr = Self::find_available_port(ip, base.port)?;
        Ok(Self { base, addr })
    }

    /// Find the first bindable port at or above `requested_port`.
    pub fn find_available_port(ip: IpAddr, requested_port: u16) -> Result<SocketAddr> {
        use std::net::TcpListener;

        if requested_port < 1024 {
            crate::ui::warning(&format!(
                "Port {} is in privileged range, may require root access",
                requested_port
            ));
        }

        let addr = SocketAddr::new(ip, requested_port);
        if TcpListener::bind(addr).is_ok() {
            return Ok(addr);
        }

        for offset in 1..=PORT_FALLBACK_RANGE {
            let Some(port) = requested_port.checked_add(offset) else {
                break;
            };
            let addr = SocketAddr::new(ip, port);
            if TcpListener::bind(addr).is_ok() {
                crate::ui::warning(&format!(
                    "Port {} is busy, using port {} instead",
                    requested_port, port
                ));
                return Ok(addr);
            }
        }

        Err(ConfigError::NoAvailablePort {
            start: requested_port,
            end: requested_port.saturating_add(PORT_FALLBACK_RANGE),
        }
        .into())
    }

    /// Whether to open the browser once listening.
    pub fn open(&self) -> bool {
        self.base.open
    }

    /// URL printed to the terminal and opened in the browser.
    ///
    /// Wildcard binds are shown as loopback so the URL is clickable.
    pub fn server_url(&self) -> String {
        let addr = if self.addr.ip().is_unspecified() {
            let loopback = match self.addr.ip() {
                IpAddr::V4(_) => IpAddr::from([127, 0, 0, 1]),
                IpAddr::V6(_) => IpAddr::from([0u16, 0, 0, 0, 0, 0, 0, 1]),
            };
            SocketAddr::new(loopback, self.addr.port())
        } else {
            self.addr
        };
        format!("http://{}", addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use std::net::TcpListener;

    const LOOPBACK: IpAddr = IpAddr::V4(std::net::Ipv4Addr::LOCALHOST);

    fn config_with(addr: SocketAddr) -> DevConfig {
        DevConfig {
            base: NobuConfig::default(),
            addr,
        }
    }

    #[test]
    fn test_find_available_port_success() {
        let listener = match TcpListener::bind(("127.0.0.1", 0)) {
            Ok(listener) => listener,
            Err(err) => {
                eprintln!("Skipping test_find_available_port_success: unable to bind socket ({})", err);
                return;
            }
        };

        let start_port = listener.local_addr().unwrap().port();
        drop(listener);

        let addr = DevConfig::find_available_port(LOOPBACK, start_port).expect("should find port");
        assert_eq!(addr.ip(), LOOPBACK);
        assert!(addr.port() >= start_port);
    }

    #[test]
    fn test_find_available_port_skips_busy_port() {
        let Ok(listener) = TcpListener::bind(("127.0.0.1", 0)) else {
            return;
        };
        let busy = listener.local_addr().unwrap().port();
        if busy > u16::MAX - PORT_FALLBACK_RANGE {
            return;
        }

        match DevConfig::find_available_port(LOOPBACK, busy) {
            Ok(addr) => assert!(addr.port() > busy && addr.port() <= busy + PORT_FALLBACK_RANGE),
            Err(err) => assert!(matches!(
                err,
                CliError::Config(ConfigError::NoAvailablePort { .. })
            )),
        }
    }

    #[test]
    fn test_from_config_rejects_hostname() {
        let base = NobuConfig {
            host: "example.com".to_string(),
            ..NobuConfig::default()
        };
        assert!(DevConfig::from_config(base).is_err());
    }

    #[test]
    fn test_server_url() {
        let config = config_with(SocketAddr::from(([127, 0, 0, 1], 3000)));
        assert_eq!(config.server_url(), "http://127.0.0.1:3000");

        let config = config_with(SocketAddr::from(([0, 0, 0, 0], 8080)));
        assert_eq!(config.server_url(), "http://127.0.0.1:8080");

        let config = config_with("[::]:4000".parse().unwrap());
        assert_eq!(config.server_url(), "http://[::1]:4000");
    }
}
