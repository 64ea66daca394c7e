use std::path::PathBuf;

use domain_types::types::TransportSettings;

use crate::logger::config::Log;

/// Prefix of environment variables overriding file settings, e.g.
/// `GEOPAY__TRANSPORT__READ_TIMEOUT_SECS=20`.
pub const ENV_PREFIX: &str = "GEOPAY";

#[derive(Clone, serde::Deserialize, Debug, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub log: Log,
    pub transport: TransportSettings,
}

impl Config {
    /// Function to build the configuration by picking it from default locations
    pub fn new() -> Result<Self, config::ConfigError> {
        Self::new_with_config_path(None)
    }

    /// Build the configuration from an optional TOML file and the environment.
    /// Nothing is required; unset values fall back to their defaults.
    pub fn new_with_config_path(
        explicit_config_path: Option<PathBuf>,
    ) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(config_path) = explicit_config_path {
            builder = builder.add_source(config::File::from(config_path).required(false));
        }
        let config = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("transport.proxy.bypass_proxy_urls"),
            )
            .build()?;

        serde_path_to_error::deserialize(config).map_err(|error| {
            tracing::error!(%error, "Unable to deserialize connector configuration");
            error.into_inner()
        })
    }
}
