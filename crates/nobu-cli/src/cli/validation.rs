use std::net::IpAddr;

/// Validates a bind address given on the command line.
///
/// Only IP literals are accepted; `localhost` is mapped to `127.0.0.1`.
pub fn parse_host(s: &str) -> Result<String, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Host cannot be empty".to_string());
    }
    if s.eq_ignore_ascii_case("localhost") {
        return Ok("127.0.0.1".to_string());
    }

    s.parse::<IpAddr>()
        .map(|ip| ip.to_string())
        .map_err(|_| format!("'{}' is not an IP address (e.g. 127.0.0.1 or 0.0.0.0)", s))
}
