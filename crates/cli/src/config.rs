//! Configuration file loading
//!
//! The config is a toml file with `${VAR}` environment substitution
//! applied over the raw text before parsing, so secrets never need to
//! live in the file itself. The rest of the program receives the
//! resolved structure and never re-parses anything.

use pipeline::{DatabaseSpec, PostgresConnection};
use retention::{NamingScheme, RetentionPolicy};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("environment variable '{0}' is required by the config but not set")]
    MissingEnvVar(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Resolved configuration for one backup set.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// rclone remote spec, e.g. `b2:bucket/backups`
    pub remote: String,
    /// Directories to include in every archive
    #[serde(default)]
    pub dirs: Vec<PathBuf>,
    pub format: FileFormat,
    #[serde(default)]
    pub pruning: RetentionPolicy,
    #[serde(default)]
    pub databases: Databases,
    pub logs: Option<LogConfig>,
    pub service: Option<ServiceConfig>,
}

#[derive(Debug, Deserialize)]
pub struct FileFormat {
    pub prefix: String,
    /// chrono format string for the timestamp portion of artifact names
    pub datetime: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct Databases {
    #[serde(default)]
    pub postgres: Vec<PostgresDatabase>,
    #[serde(default)]
    pub sqlite: Vec<SqliteDatabase>,
}

#[derive(Debug, Deserialize)]
pub struct PostgresDatabase {
    pub name: String,
    pub host: String,
    pub port: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SqliteDatabase {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct LogConfig {
    pub dir: PathBuf,
}

/// Raw service-mode settings; validated by `Schedule::from_config`.
#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub enabled: bool,
    /// One of: hourly, daily, weekly
    pub frequency: String,
    pub num_hours: Option<u32>,
    /// `HH:MM`, local time
    pub time_of_day: Option<String>,
    pub day_of_week: Option<String>,
}

impl Config {
    pub fn naming_scheme(&self) -> NamingScheme {
        NamingScheme::new(self.format.prefix.clone(), self.format.datetime.clone())
    }

    pub fn database_specs(&self) -> Vec<DatabaseSpec> {
        let mut specs: Vec<DatabaseSpec> = self
            .databases
            .postgres
            .iter()
            .map(|db| {
                DatabaseSpec::Postgres(PostgresConnection {
                    name: db.name.clone(),
                    host: db.host.clone(),
                    port: db.port.clone(),
                    username: db.username.clone(),
                    password: db.password.clone(),
                })
            })
            .collect();
        specs.extend(self.databases.sqlite.iter().map(|db| DatabaseSpec::Sqlite {
            path: db.path.clone(),
        }));
        specs
    }

    /// Loggable view of the config with secrets redacted.
    pub fn describe(&self) -> serde_json::Value {
        serde_json::json!({
            "remote": self.remote,
            "dirs": self.dirs,
            "format": {
                "prefix": self.format.prefix,
                "datetime": self.format.datetime,
            },
            "pruning": self.pruning.to_string(),
            "databases": self
                .database_specs()
                .iter()
                .map(|db| db.to_string())
                .collect::<Vec<_>>(),
        })
    }
}

/// Load and resolve the config file.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&raw)
}

fn parse(raw: &str) -> Result<Config, ConfigError> {
    let expanded = expand_env(raw)?;
    let file: ConfigFile =
        toml::from_str(&expanded).map_err(|e| ConfigError::Invalid(e.to_string()))?;
    Ok(file.backup)
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    backup: Config,
}

/// Expand every `${VAR}` occurrence from the environment.
fn expand_env(input: &str) -> Result<String, ConfigError> {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after
            .find('}')
            .ok_or_else(|| ConfigError::Invalid(format!("unterminated ${{...}} near '{}'", &rest[start..rest.len().min(start + 20)])))?;
        let name = &after[..end];
        let value =
            std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))?;
        out.push_str(&value);
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    Ok(out)
}
