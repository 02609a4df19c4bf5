use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Defaults compiled into the binary; files and env vars layer on top.
const DEFAULT_CONFIG: &str = include_str!("../global_config.yaml");

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_dev_env")]
    pub dev_env: String,
    pub logging: LoggingConfig,
    pub repl: ReplConfig,
    pub daemon: DaemonConfig,
}

fn default_dev_env() -> String {
    "dev".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub verbose: bool,
    pub format: LoggingFormatConfig,
    pub levels: LoggingLevelsConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingFormatConfig {
    pub show_time: bool,
    #[serde(default)]
    pub json: bool,
    pub location: LoggingLocationConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingLocationConfig {
    pub show_file: bool,
    pub show_line: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingLevelsConfig {
    pub debug: bool,
    pub info: bool,
    pub warning: bool,
    pub error: bool,
    pub critical: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ReplConfig {
    pub prompt: String,
    /// Print the full engine state after every line.
    #[serde(default)]
    pub show_state: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DaemonConfig {
    pub socket_path: PathBuf,
}

/// Directory searched for override files: the crate dir under cargo, else CWD.
fn config_dir() -> PathBuf {
    std::env::var("CARGO_MANIFEST_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

pub fn load_config() -> Result<AppConfig, ConfigError> {
    let base_path = config_dir();

    let builder = Config::builder()
        // Built-in defaults
        .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Yaml))
        // Load production config if present
        .add_source(File::from(base_path.join("production_config.yaml")).required(false))
        // Load local override
        .add_source(File::from(base_path.join(".global_config.yaml")).required(false))
        // Map nested env vars like APP__REPL__PROMPT=calc
        .add_source(Environment::with_prefix("APP").separator("__"));

    builder.build()?.try_deserialize()
}
