mod settings;

use config::{Config, ConfigError, Environment, File};

use settings::PartialSettings;

pub use settings::{
    BridgeSettings, HttpSettings, LoggingSettings, ServerSettings, Settings, ZenohSettings,
};

/// Prefix of environment variables, e.g. `FOXBRIDGE_SERVER__PORT=9000`.
pub const ENV_PREFIX: &str = "FOXBRIDGE";

/// Loads the configuration from the default file and environment variables.
pub fn load_config() -> Result<Settings, ConfigError> {
    load_config_from(None)
}

/// Loads the configuration from `path` (or `config/default` when `None`)
/// and environment variables, then merges the result with default values.
///
/// An explicit `path` must exist; the default file is optional.
pub fn load_config_from(path: Option<&str>) -> Result<Settings, ConfigError> {
    let file = match path {
        Some(path) => File::with_name(path).required(true),
        None => File::with_name("config/default").required(false),
    };

    let builder = Config::builder().add_source(file).add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("zenoh.connect")
            .with_list_parse_key("zenoh.listen")
            .with_list_parse_key("bridge.ignored_topics")
            .with_list_parse_key("bridge.schema_exclusions"),
    );

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    Ok(partial.merge(Settings::default()))
}

#[cfg(test)]
mod tests;
