use std::fs;
use std::path::PathBuf;

use clap::Parser;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::codec::Charset;

/// Configuration for jsonfield
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// URL for the database connection
    pub database_url: String,
    /// Charset used to decode stored JSON bytes
    pub default_charset: Charset,
}

/// Update structure for Config with all fields optional
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ConfigUpdate {
    /// Optional update for database URL
    #[serde(default)]
    pub database_url: Option<String>,
    /// Optional update for the default charset
    #[serde(default)]
    pub default_charset: Option<Charset>,
}

/// Command line arguments shared by every jsonfield command
#[derive(Parser, Debug, Default)]
pub struct CliArgs {
    /// Database URL
    #[clap(long, env = "DATABASE_URL", global = true)]
    pub database_url: Option<String>,

    /// Charset used to decode stored JSON bytes (utf-8 or latin-1)
    #[clap(long, env = "JSONFIELD_DEFAULT_CHARSET", global = true)]
    pub default_charset: Option<Charset>,

    /// Debug mode
    #[clap(long, env = "JSONFIELD_DEBUG", default_value_t = false, global = true)]
    pub debug: bool,
}

impl Config {
    /// Applies a config update to the current configuration
    pub fn apply_update(self, update: ConfigUpdate) -> Self {
        Self {
            database_url: update.database_url.unwrap_or(self.database_url),
            default_charset: update.default_charset.unwrap_or(self.default_charset),
        }
    }
}

/// Returns the base (default) configuration
pub fn base_config(config_dir: Option<PathBuf>) -> Config {
    let database_url = config_dir.map_or("jsonfield.db".to_string(), |path| {
        path.join("jsonfield.db").to_string_lossy().to_string()
    });

    Config {
        database_url,
        default_charset: Charset::default(),
    }
}

/// Returns the XDG config directory for jsonfield, if one can be determined
pub fn get_config_dir_path() -> Option<PathBuf> {
    match ProjectDirs::from("com", "jsonfield", "jsonfield") {
        Some(proj_dirs) => Some(proj_dirs.config_dir().to_path_buf()),
        None => {
            warn!("Could not determine XDG config directory, skipping config file");
            None
        }
    }
}

/// Loads configuration from a TOML file
pub fn config_from_file(config_path: Option<PathBuf>) -> Result<ConfigUpdate, String> {
    let Some(config_path) = config_path else {
        return Ok(ConfigUpdate::default());
    };

    if !config_path.exists() {
        info!("Config file not found at {:?}, using defaults", config_path);
        return Ok(ConfigUpdate::default());
    }

    match fs::read_to_string(&config_path) {
        Ok(content) => match toml::from_str::<ConfigUpdate>(&content) {
            Ok(config) => {
                info!("Loaded configuration from {:?}", config_path);
                Ok(config)
            }
            Err(e) => {
                warn!("Failed to parse config file: {}", e);
                Err(format!("Failed to parse config file: {}", e))
            }
        },
        Err(e) => {
            warn!("Failed to read config file: {}", e);
            Err(format!("Failed to read config file: {}", e))
        }
    }
}

/// Loads configuration from command line arguments
pub fn config_from_args(args: &CliArgs) -> ConfigUpdate {
    ConfigUpdate {
        database_url: args.database_url.clone(),
        default_charset: args.default_charset,
    }
}

/// Gets the complete configuration by combining defaults with
/// values from config file, environment variables, and command line arguments
/// in order of increasing precedence
pub fn get_config(args: &CliArgs) -> Config {
    let config_dir = get_config_dir_path().and_then(|path| {
        if !path.exists() {
            info!("Config path not found at {:?}, using defaults", path);
            None
        } else {
            Some(path)
        }
    });

    let base = base_config(config_dir.clone());
    let file_update = config_from_file(config_dir.map(|dir| dir.join("config.toml")));

    let config = base
        .apply_update(file_update.unwrap_or_default())
        .apply_update(config_from_args(args));

    info!(
        "Final configuration: database_url={}, default_charset={}",
        config.database_url, config.default_charset
    );

    config
}
