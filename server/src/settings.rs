use anyhow::Context;
use config::{Config, Environment, File};
use serde::Deserialize;

const CONFIG_FILE: &str = "meetlink";
const ENV_PREFIX: &str = "MEETLINK";

/// Runtime settings of the room store server, read from the `[server]` table
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServerSettings {
    /// TCP port to accept store sessions on
    pub port: u16,
    /// Prefix every room URL is derived from
    pub room_url_base: String,
}

#[derive(Debug, Deserialize)]
struct Settings {
    server: ServerSettings,
}

impl ServerSettings {
    /// Layers built-in defaults, an optional `meetlink.toml` in the working directory
    /// and `MEETLINK_SERVER__*` environment variables, in that order.
    pub fn load() -> anyhow::Result<Self> {
        Self::from_builder(
            Config::builder()
                .add_source(File::with_name(CONFIG_FILE).required(false))
                .add_source(
                    Environment::with_prefix(ENV_PREFIX)
                        .prefix_separator("_")
                        .separator("__")
                        .try_parsing(true),
                ),
        )
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> anyhow::Result<Self> {
        let settings: Settings = builder
            .set_default("server.port", 8080)?
            .set_default("server.room_url_base", "https://meetlink.daily.co")?
            .build()
            .context("could not assemble the configuration sources")?
            .try_deserialize()
            .context("invalid server configuration")?;

        Ok(settings.server)
    }
}
