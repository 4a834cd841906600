//! Broker connection settings.
//!
//! Values come from the process environment once at startup; every setting has a
//! default suitable for a local development broker.
use crate::error::StockBotError;
use crate::result::Result;

/// Broker host variable.
pub const HOST_VAR: &str = "RABBITMQ_HOST";
/// Broker port variable.
pub const PORT_VAR: &str = "RABBITMQ_PORT";
/// Broker user variable.
pub const USER_VAR: &str = "RABBITMQ_USER";
/// Broker password variable.
pub const PASS_VAR: &str = "RABBITMQ_PASS";
/// Broker virtual host variable.
pub const VHOST_VAR: &str = "RABBITMQ_VHOST";

/// AMQP broker connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerConfig {
    /// Broker host name.
    pub host: String,
    /// Broker AMQP port.
    pub port: u16,
    /// Login user.
    pub username: String,
    /// Login password.
    pub password: String,
    /// Virtual host.
    pub vhost: String,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        BrokerConfig {
            host: "localhost".to_string(),
            port: 5672,
            username: "guest".to_string(),
            password: "guest".to_string(),
            vhost: "/".to_string(),
        }
    }
}

impl BrokerConfig {
    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`, falling back to defaults for unset or blank values.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = BrokerConfig::default();
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let port = match read(PORT_VAR) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e| StockBotError::Config(format!("{PORT_VAR}={raw}: {e}")))?,
            None => defaults.port,
        };

        Ok(BrokerConfig {
            host: read(HOST_VAR).unwrap_or(defaults.host),
            port,
            username: read(USER_VAR).unwrap_or(defaults.username),
            password: read(PASS_VAR).unwrap_or(defaults.password),
            vhost: read(VHOST_VAR).unwrap_or(defaults.vhost),
        })
    }

    /// Builds the `amqp://` URI, percent-encoding credentials and the virtual host.
    pub fn amqp_uri(&self) -> String {
        format!(
            "amqp://{}:{}@{}:{}/{}",
            urlencoding::encode(&self.username),
            urlencoding::encode(&self.password),
            self.host,
            self.port,
            urlencoding::encode(&self.vhost)
        )
    }
}
