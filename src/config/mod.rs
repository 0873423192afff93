//! Configuration loading.
//!
//! Sources are layered lowest to highest: `config/default.{toml,yaml,json}`,
//! `APP_`-prefixed environment variables using `__` between sections
//! (`APP_SERVER__PORT=8081`), and finally `BROKER_URI`.

mod settings;

use config::{Config, Environment, File};

use crate::utils::error::ConfigError;

pub use settings::{BrokerSettings, HttpSettings, PartialSettings, ServerSettings, Settings};

/// Environment variable that selects the broker address.
pub const BROKER_URI_ENV: &str = "BROKER_URI";

/// Loads the configuration from the default file location and the environment.
pub fn load_config() -> Result<Settings, ConfigError> {
    load_config_from("config/default")
}

/// Loads the configuration using `path` (without extension) as the file source.
pub fn load_config_from(path: &str) -> Result<Settings, ConfigError> {
    let broker_uri = std::env::var(BROKER_URI_ENV)
        .ok()
        .map(|uri| uri.trim().to_string())
        .filter(|uri| !uri.is_empty());

    let builder = Config::builder()
        .add_source(File::with_name(path).required(false))
        .add_source(
            Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .set_override_option("broker.uri", broker_uri)?;

    let config = builder.build()?;
    let partial: PartialSettings = config.try_deserialize()?;
    let settings = Settings::merge(partial);

    validate(&settings)?;
    Ok(settings)
}

fn validate(settings: &Settings) -> Result<(), ConfigError> {
    let uri = &settings.broker.uri;
    if !uri.starts_with("ws://") {
        return Err(ConfigError::Invalid(format!(
            "broker.uri must be a ws:// address, got {uri:?}"
        )));
    }
    if settings.http.body_limit_bytes == 0 {
        return Err(ConfigError::Invalid(
            "http.body_limit_bytes must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests;
