use std::time::Duration;

use serde::Deserialize;

/// Top-level configuration settings for the application.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server: ServerSettings,
    pub broker: BrokerSettings,
    pub http: HttpSettings,
}

/// Where the HTTP listener binds and how loudly it logs.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

/// How the service reaches the PopSub broker.
///
/// `username`/`password` are optional; when both are set the connector
/// performs the login -> auth handshake before publishing.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct BrokerSettings {
    pub uri: String,
    pub connect_attempts: u32,
    pub retry_delay_ms: u64,
    pub publish_timeout_ms: u64,
    pub queue_capacity: usize,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Limits applied to inbound HTTP requests.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct HttpSettings {
    pub body_limit_bytes: usize,
    pub request_timeout_ms: u64,
}

/// Partial configuration settings loaded from files or environment.
///
/// Missing values are filled from `Settings::default()`.
#[derive(Debug, Deserialize, Default)]
pub struct PartialSettings {
    pub server: Option<PartialServerSettings>,
    pub broker: Option<PartialBrokerSettings>,
    pub http: Option<PartialHttpSettings>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PartialServerSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PartialBrokerSettings {
    pub uri: Option<String>,
    pub connect_attempts: Option<u32>,
    pub retry_delay_ms: Option<u64>,
    pub publish_timeout_ms: Option<u64>,
    pub queue_capacity: Option<usize>,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PartialHttpSettings {
    pub body_limit_bytes: Option<usize>,
    pub request_timeout_ms: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                host: "0.0.0.0".to_string(),
                port: 80,
                log_level: "info".to_string(),
            },
            broker: BrokerSettings {
                uri: "ws://127.0.0.1:8080".to_string(),
                connect_attempts: 5,
                retry_delay_ms: 1000,
                publish_timeout_ms: 2000,
                queue_capacity: 1024,
                username: None,
                password: None,
            },
            http: HttpSettings {
                body_limit_bytes: 1024 * 1024,
                request_timeout_ms: 10_000,
            },
        }
    }
}

impl Settings {
    /// Overlays whatever the sources provided on top of the defaults.
    pub fn merge(partial: PartialSettings) -> Self {
        let default = Settings::default();
        let server = partial.server.unwrap_or_default();
        let broker = partial.broker.unwrap_or_default();
        let http = partial.http.unwrap_or_default();

        Settings {
            server: ServerSettings {
                host: server.host.unwrap_or(default.server.host),
                port: server.port.unwrap_or(default.server.port),
                log_level: server.log_level.unwrap_or(default.server.log_level),
            },
            broker: BrokerSettings {
                uri: broker.uri.unwrap_or(default.broker.uri),
                connect_attempts: broker
                    .connect_attempts
                    .unwrap_or(default.broker.connect_attempts),
                retry_delay_ms: broker.retry_delay_ms.unwrap_or(default.broker.retry_delay_ms),
                publish_timeout_ms: broker
                    .publish_timeout_ms
                    .unwrap_or(default.broker.publish_timeout_ms),
                queue_capacity: broker.queue_capacity.unwrap_or(default.broker.queue_capacity),
                username: broker.username.or(default.broker.username),
                password: broker.password.or(default.broker.password),
            },
            http: HttpSettings {
                body_limit_bytes: http.body_limit_bytes.unwrap_or(default.http.body_limit_bytes),
                request_timeout_ms: http
                    .request_timeout_ms
                    .unwrap_or(default.http.request_timeout_ms),
            },
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl BrokerSettings {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn publish_timeout(&self) -> Duration {
        Duration::from_millis(self.publish_timeout_ms)
    }

    /// Login credentials, only when both halves are present.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some((user.as_str(), pass.as_str())),
            _ => None,
        }
    }
}

impl HttpSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
