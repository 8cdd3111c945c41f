use anyhow::Context;
use config::{Config, Environment, File};
use serde::Deserialize;

const CONFIG_FILE: &str = "meetlink";
const ENV_PREFIX: &str = "MEETLINK";

/// Settings of the terminal client, read from the `[tui]` table
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TuiSettings {
    /// Host and port of the room store
    pub server_addr: String,
    /// Name other participants see next to our chat messages
    pub display_name: String,
    /// Log records are written here, logging is off when unset
    pub log_file: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Settings {
    tui: TuiSettings,
}

impl TuiSettings {
    /// Layers built-in defaults, an optional `meetlink.toml` in the working directory
    /// and `MEETLINK_TUI__*` environment variables, in that order.
    pub fn load() -> anyhow::Result<Self> {
        Self::from_builder(
            Config::builder()
                .add_source(File::with_name(CONFIG_FILE).required(false))
                .add_source(
                    Environment::with_prefix(ENV_PREFIX)
                        .prefix_separator("_")
                        .separator("__"),
                ),
        )
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> anyhow::Result<Self> {
        let settings: Settings = builder
            .set_default("tui.server_addr", "localhost:8080")?
            .set_default("tui.display_name", "guest")?
            .build()
            .context("could not assemble the configuration sources")?
            .try_deserialize()
            .context("invalid tui configuration")?;

        Ok(settings.tui)
    }
}

/// The terminal belongs to the UI, so records either go to the configured file or nowhere
pub fn init_logger(settings: &TuiSettings) -> anyhow::Result<()> {
    let Some(path) = settings.log_file.as_ref() else {
        return Ok(());
    };

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("could not open log file {}", path))?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()
        .context("could not install the logger")?;

    Ok(())
}
