//! Configuration loading and database location resolution
//!
//! Every value is resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)

use crate::db::is_in_memory;
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const ENV_DATABASE_URI: &str = "RECIPES_DATABASE_URI";
pub const ENV_DATABASE_NAME: &str = "RECIPES_DATABASE";
pub const ENV_BIND: &str = "RECIPES_BIND";
pub const ENV_PORT: &str = "RECIPES_PORT";
pub const ENV_CONFIG_FILE: &str = "RECIPES_CONFIG";

pub const DEFAULT_DATABASE_NAME: &str = "recipes";
pub const DEFAULT_BIND: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub database_uri: Option<String>,
    pub database_name: Option<String>,
    pub bind: Option<String>,
    pub port: Option<u16>,
    pub config_file: Option<PathBuf>,
}

/// Resolved service configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    /// Connection URI or storage location
    pub database_uri: String,
    /// Database name; selects the file when the URI names a directory
    pub database_name: String,
    pub bind: String,
    pub port: u16,
}

impl ServiceConfig {
    /// Resolve configuration from overrides, environment, config file and defaults
    pub fn resolve(overrides: &ConfigOverrides) -> Result<Self> {
        let file = load_config_table(overrides.config_file.as_deref())?;
        let file = file.as_ref();

        let database_uri = resolve_value(
            overrides.database_uri.as_deref(),
            ENV_DATABASE_URI,
            file,
            "database_uri",
        )
        .unwrap_or_else(default_database_uri);

        let database_name = resolve_value(
            overrides.database_name.as_deref(),
            ENV_DATABASE_NAME,
            file,
            "database_name",
        )
        .unwrap_or_else(|| DEFAULT_DATABASE_NAME.to_string());

        if !is_valid_database_name(&database_name) {
            return Err(Error::Config(format!(
                "Invalid database name: {}",
                database_name
            )));
        }

        let bind = resolve_value(overrides.bind.as_deref(), ENV_BIND, file, "bind")
            .unwrap_or_else(|| DEFAULT_BIND.to_string());

        let cli_port = overrides.port.map(|p| p.to_string());
        let port = match resolve_value(cli_port.as_deref(), ENV_PORT, file, "port") {
            Some(value) => value
                .parse::<u16>()
                .map_err(|e| Error::Config(format!("Invalid port '{}': {}", value, e)))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            database_uri,
            database_name,
            bind,
            port,
        })
    }

    /// sqlx connection URL for the configured database
    ///
    /// A URI naming a `.db` file (or an in-memory database) is used as is.
    /// Anything else is treated as a directory holding `<database_name>.db`.
    pub fn database_url(&self) -> String {
        let uri = self.database_uri.trim();
        if is_in_memory(uri) {
            return uri.to_string();
        }

        let uri = if uri.starts_with("sqlite:") {
            uri.to_string()
        } else {
            format!("sqlite://{}", uri)
        };

        let (location, params) = match uri.split_once('?') {
            Some((location, params)) => (location.to_string(), Some(params.to_string())),
            None => (uri, None),
        };

        let file = if is_database_file(&location) {
            location
        } else {
            format!(
                "{}/{}.db",
                location.strip_suffix('/').unwrap_or(&location),
                self.database_name
            )
        };

        match params {
            Some(params) => format!("{}?{}", file, params),
            None => format!("{}?mode=rwc", file),
        }
    }

    /// Socket address string for the HTTP listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

/// First value found: CLI argument, environment variable, then config file key
pub fn resolve_value(
    cli_arg: Option<&str>,
    env_var_name: &str,
    config_file: Option<&toml::Table>,
    config_file_key: &str,
) -> Option<String> {
    // Priority 1: Command-line argument
    if let Some(value) = cli_arg {
        return Some(value.to_string());
    }

    // Priority 2: Environment variable
    if let Ok(value) = std::env::var(env_var_name) {
        if !value.is_empty() {
            return Some(value);
        }
    }

    // Priority 3: TOML config file
    config_file
        .and_then(|table| table.get(config_file_key))
        .map(|value| match value {
            toml::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
}

/// Load the TOML config file, if any
///
/// An explicitly named file (argument or `RECIPES_CONFIG`) must exist; the
/// platform default locations are optional.
fn load_config_table(explicit: Option<&Path>) -> Result<Option<toml::Table>> {
    let explicit = explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var(ENV_CONFIG_FILE).ok().map(PathBuf::from));

    let path = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            path
        }
        None => match default_config_file() {
            Some(path) => path,
            None => {
                debug!("No config file found, using environment and defaults");
                return Ok(None);
            }
        },
    };

    let content = std::fs::read_to_string(&path)?;
    let table = content
        .parse::<toml::Table>()
        .map_err(|e| Error::Config(format!("Invalid config file {}: {}", path.display(), e)))?;

    info!("Loaded config file: {}", path.display());
    Ok(Some(table))
}

/// First existing default config file for the platform
fn default_config_file() -> Option<PathBuf> {
    // Try ~/.config/recipes/config.toml first, then /etc/recipes/config.toml
    let user_config = dirs::config_dir().map(|d| d.join("recipes").join("config.toml"));
    let system_config = PathBuf::from("/etc/recipes/config.toml");

    user_config
        .into_iter()
        .chain(std::iter::once(system_config))
        .find(|path| path.exists())
}

/// OS-dependent default database location
fn default_database_uri() -> String {
    let dir = dirs::data_local_dir()
        .map(|d| d.join("recipes"))
        .unwrap_or_else(|| PathBuf::from("./recipes_data"));
    format!("sqlite://{}", dir.display())
}

fn is_database_file(location: &str) -> bool {
    [".db", ".sqlite", ".sqlite3"]
        .iter()
        .any(|ext| location.ends_with(ext))
}

/// Database names become file names: keep them to a safe alphabet
fn is_valid_database_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() < 100
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
}
