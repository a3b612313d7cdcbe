mod settings;

use config::{Config, ConfigError, Environment, File};

use settings::PartialSettings;

pub use settings::{BrokerSettings, LogSettings, PublisherSettings, ServerSettings, Settings};

/// Prefix for environment overrides, e.g. `PUSHHUB_BROKER__MAILBOX_CAPACITY=4`.
pub const ENV_PREFIX: &str = "PUSHHUB";

/// Loads the configuration from `config/default` and the environment,
/// merged over [`Settings::default`].
pub fn load_config() -> Result<Settings, ConfigError> {
    load_config_from("config/default")
}

/// Same as [`load_config`] with an explicit file path (extension optional).
/// The file may be missing.
pub fn load_config_from(path: &str) -> Result<Settings, ConfigError> {
    let config = Config::builder()
        .add_source(File::with_name(path).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let partial: PartialSettings = config.try_deserialize()?;
    Ok(partial.merge(Settings::default()))
}
