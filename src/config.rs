use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub server: ServerSettings,
    pub matchmaking: MatchmakingSettings,
    pub session: SessionSettings,
    pub catalog: CatalogSettings,
    pub agent: AgentSettings,
    pub archive: ArchiveSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        println!("Loading configuration for RUN_MODE: {}", &run_mode);

        let s = Config::builder()
            // Load environment-specific file (e.g., development.toml, production.toml)
            .add_source(
                File::with_name(&format!("config/{}", run_mode))
                    .format(FileFormat::Toml)
                    .required(true),
            )
            // Add environment variables (e.g., APP_SERVER__PORT=8000)
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind_address: String,
    pub port: u16,
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub directory: String,
    pub filename: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MatchmakingSettings {
    pub queue_names: Vec<String>,
    pub custom_queue_prefix: String,
    pub game_types: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionSettings {
    pub heartbeat_interval_seconds: u64,
    pub client_timeout_seconds: u64,
    /// Inactivity beyond this gets the participant force-quit.
    pub idle_timeout_seconds: u64,
    /// Idle checks run on this fixed interval, independent of traffic.
    pub idle_check_interval_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogSettings {
    pub cards_path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AgentSettings {
    pub deck_name: String,
    pub decks_directory: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ArchiveSettings {
    pub enabled: bool,
    pub directory: String,
}
