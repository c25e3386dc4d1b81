//! Configuration for the flight assistant.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::core::errors::{AssistantError, AssistantResult};

/// Environment variable overriding [`ServerConfig::host`].
pub const ENV_HOST: &str = "FLIGHT_ASSISTANT_HOST";
/// Environment variable overriding [`ServerConfig::port`].
pub const ENV_PORT: &str = "FLIGHT_ASSISTANT_PORT";
/// Environment variable overriding [`ReplyConfig::latency_ms`].
pub const ENV_REPLY_LATENCY_MS: &str = "FLIGHT_ASSISTANT_REPLY_LATENCY_MS";

/// Top-level configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Reply scheduling settings.
    pub replies: ReplyConfig,
    /// Response engine settings.
    pub engine: EngineConfig,
}

impl AssistantConfig {
    /// Defaults overridden by any `FLIGHT_ASSISTANT_*` environment variables.
    ///
    /// # Errors
    /// Returns an error if a variable is set but cannot be parsed.
    pub fn from_env() -> AssistantResult<Self> {
        let mut config = Self::default();

        if let Ok(host) = std::env::var(ENV_HOST) {
            config.server.host = host;
        }
        if let Ok(port) = std::env::var(ENV_PORT) {
            config.server.port = port
                .parse()
                .map_err(|_| AssistantError::InvalidConfig(format!("{ENV_PORT}={port}")))?;
        }
        if let Ok(latency) = std::env::var(ENV_REPLY_LATENCY_MS) {
            config.replies.latency_ms = latency.parse().map_err(|_| {
                AssistantError::InvalidConfig(format!("{ENV_REPLY_LATENCY_MS}={latency}"))
            })?;
        }

        Ok(config)
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if any values are out of range or invalid.
    pub fn validate(&self) -> AssistantResult<()> {
        if self.server.port == 0 {
            return Err(AssistantError::InvalidConfig(
                "server.port must be > 0".to_string(),
            ));
        }

        self.server.socket_addr()?;

        if self.engine.arrival_lead_hours == 0 || self.engine.arrival_lead_hours > 12 {
            return Err(AssistantError::InvalidConfig(
                "engine.arrival_lead_hours must be in 1..=12".to_string(),
            ));
        }

        self.engine.default_departure()?;

        Ok(())
    }
}

/// HTTP server settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl ServerConfig {
    /// Resolve the socket address to bind.
    ///
    /// # Errors
    /// Returns an error if `host` is not an IP address.
    pub fn socket_addr(&self) -> AssistantResult<SocketAddr> {
        let ip: IpAddr = self.host.parse().map_err(|_| {
            AssistantError::InvalidConfig(format!("server.host is not an IP address: {}", self.host))
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Reply scheduling settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReplyConfig {
    /// Simulated latency before a reply is appended, in milliseconds.
    pub latency_ms: u64,
}

impl Default for ReplyConfig {
    fn default() -> Self {
        Self { latency_ms: 1000 }
    }
}

impl ReplyConfig {
    /// Latency as a [`Duration`].
    #[must_use]
    pub const fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }
}

/// Response engine settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EngineConfig {
    /// How long before departure travellers are told to arrive.
    pub arrival_lead_hours: u32,
    /// Departure time used when a submission leaves it blank (`HH:MM`).
    pub default_departure_time: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            arrival_lead_hours: 2,
            default_departure_time: "08:00".to_string(),
        }
    }
}

impl EngineConfig {
    /// Parsed default departure time.
    ///
    /// # Errors
    /// Returns an error if the configured value is not `HH:MM`.
    pub fn default_departure(&self) -> AssistantResult<NaiveTime> {
        NaiveTime::parse_from_str(&self.default_departure_time, "%H:%M").map_err(|err| {
            AssistantError::InvalidConfig(format!(
                "engine.default_departure_time {:?}: {err}",
                self.default_departure_time
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AssistantConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.replies.latency(), Duration::from_secs(1));
        assert_eq!(config.engine.arrival_lead_hours, 2);
    }

    #[test]
    fn test_validate_rejects_zero_port() {
        let mut config = AssistantConfig::default();
        config.server.port = 0;
        assert!(matches!(
            config.validate(),
            Err(AssistantError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AssistantConfig::default();
        config.server.host = "localhost:80".to_string();
        assert!(config.validate().is_err());

        let mut config = AssistantConfig::default();
        config.engine.default_departure_time = "8am".to_string();
        assert!(config.validate().is_err());

        let mut config = AssistantConfig::default();
        config.engine.arrival_lead_hours = 0;
        assert!(config.validate().is_err());
    }
}
