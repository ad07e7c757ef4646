//! Server settings
//!
//! Command-line flags, each also readable from the environment.

use {
    crate::generator::DEFAULT_MOCKERY_COMMAND,
    crate::logging::LogFormat,
    crate::shared::DEFAULT_MAX_MESSAGE_SIZE,
    anyhow::{Context, Result},
    clap::Parser,
    std::net::SocketAddr,
    std::time::Duration,
};

/// `--addr` value selecting the stdio transport.
pub const STDIO_ADDR: &str = "stdio";

#[derive(Debug, Clone, Parser)]
#[command(
    name = "mockery-mcp-server",
    version,
    about = "MCP server exposing Go interface discovery and mockery mock generation"
)]
pub struct ServerSettings {
    /// Listen address (host:port or :port), or "stdio" for line-delimited stdio
    #[arg(long, env = "MOCKERY_MCP_ADDR", default_value = "127.0.0.1:8080")]
    pub addr: String,

    /// Log level (trace, debug, info, warn, error); RUST_LOG overrides it
    #[arg(long, env = "MOCKERY_MCP_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[arg(long, env = "LOG_FORMAT", value_enum, ignore_case = true, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Mockery executable name or path
    #[arg(long, env = "MOCKERY_COMMAND", default_value = DEFAULT_MOCKERY_COMMAND)]
    pub mockery_command: String,

    /// Kill mockery after this many seconds; unset or 0 waits indefinitely
    #[arg(long, env = "MOCKERY_MCP_GENERATION_TIMEOUT")]
    pub generation_timeout_secs: Option<u64>,

    /// Largest accepted message in bytes
    #[arg(long, env = "MOCKERY_MCP_MAX_MESSAGE_SIZE", default_value_t = DEFAULT_MAX_MESSAGE_SIZE)]
    pub max_message_size: usize,
}

/// Where the server talks to its client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportMode {
    Stdio,
    Socket(SocketAddr),
}

impl ServerSettings {
    pub fn transport(&self) -> Result<TransportMode> {
        let addr = self.addr.trim();
        if addr.eq_ignore_ascii_case(STDIO_ADDR) {
            return Ok(TransportMode::Stdio);
        }

        // ":8080" listens on all interfaces
        let normalized = match addr.strip_prefix(':') {
            Some(port) => format!("0.0.0.0:{port}"),
            None => addr.to_string(),
        };
        let socket = normalized
            .parse::<SocketAddr>()
            .with_context(|| format!("Invalid address '{}'", self.addr))?;
        Ok(TransportMode::Socket(socket))
    }

    pub fn generation_timeout(&self) -> Option<Duration> {
        self.generation_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ServerSettings {
        let mut argv = vec!["mockery-mcp-server"];
        argv.extend_from_slice(args);
        ServerSettings::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_transport_modes() {
        assert_eq!(parse(&["--addr", "stdio"]).transport().unwrap(), TransportMode::Stdio);
        assert_eq!(
            parse(&["--addr", ":9090"]).transport().unwrap(),
            TransportMode::Socket("0.0.0.0:9090".parse().unwrap())
        );
        assert_eq!(
            parse(&["--addr", "127.0.0.1:3000"]).transport().unwrap(),
            TransportMode::Socket("127.0.0.1:3000".parse().unwrap())
        );
        assert!(parse(&["--addr", "not-an-address"]).transport().is_err());
    }

    #[test]
    fn test_generation_timeout() {
        assert_eq!(parse(&["--generation-timeout-secs", "0"]).generation_timeout(), None);
        assert_eq!(
            parse(&["--generation-timeout-secs", "30"]).generation_timeout(),
            Some(Duration::from_secs(30))
        );
    }

    #[test]
    fn test_explicit_flags() {
        let settings = parse(&[
            "--log-format",
            "JSON",
            "--mockery-command",
            "/opt/bin/mockery",
            "--max-message-size",
            "1024",
        ]);
        assert_eq!(settings.log_format, LogFormat::Json);
        assert_eq!(settings.mockery_command, "/opt/bin/mockery");
        assert_eq!(settings.max_message_size, 1024);
    }
}
