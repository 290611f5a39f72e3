//! Server configuration module

use clap::Parser;

use crate::config::{
    db::DatabaseConfig,
    messenger::MessengerConfig,
    observability::{LoggingConfig, ObservabilityConfig},
    server::ServerRuntimeConfig,
};

pub(crate) mod db;
pub(crate) mod messenger;
pub(crate) mod observability;
pub(crate) mod server;

/// Orderly JSON API Server configuration
#[derive(Debug, Parser)]
#[command(name = "orderly-json", about = "Orderly JSON API Server", long_about = None)]
pub struct ServerConfig {
    /// Server network settings.
    #[command(flatten)]
    pub server: ServerRuntimeConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Observability (traces/metrics) settings.
    #[command(flatten)]
    pub observability: ObservabilityConfig,

    /// Application database settings.
    #[command(flatten)]
    pub database: DatabaseConfig,

    /// Queue and embedded worker settings.
    #[command(flatten)]
    pub messenger: MessengerConfig,
}

impl ServerConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// Get the socket address for binding
    #[must_use]
    pub fn socket_addr(&self) -> String {
        self.server.socket_addr()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use testresult::TestResult;

    use super::*;

    #[test]
    fn parses_defaults_with_database_url() -> TestResult {
        let config = ServerConfig::try_parse_from([
            "orderly-json",
            "--database-url",
            "postgres://localhost/orderly",
        ])?;

        assert_eq!(config.database.database_url, "postgres://localhost/orderly");
        assert!(config.database.database_run_migrations);
        assert!(config.messenger.embedded_worker);
        assert_eq!(config.messenger.settings.max_retries, 3);
        assert_eq!(
            config.messenger.settings.retry_strategy().delay,
            Duration::from_secs(1)
        );

        Ok(())
    }

    #[test]
    fn socket_addr_joins_host_and_port() -> TestResult {
        let config = ServerConfig::try_parse_from([
            "orderly-json",
            "--database-url",
            "postgres://localhost/orderly",
            "--host",
            "127.0.0.1",
            "--port",
            "9000",
        ])?;

        assert_eq!(config.socket_addr(), "127.0.0.1:9000");

        Ok(())
    }
}
