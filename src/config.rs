use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use axum::Router;
use diesel_migrations::MigrationHarness;
use serde::Deserialize;
use thiserror::Error;
use tower_http::trace::TraceLayer;

use crate::{
    MIGRATIONS,
    applications::{
        routes, service::ApplicationService,
        sqlite::SqliteApplicationRepository,
    },
    directory::sqlite::SqliteDirectory,
    state::{AppState, ConnectionOptions, DbPool, build_pool},
};

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub database_url: String,
    pub bind: String,
    pub pool_size: u32,
    pub log_level: String,
    pub busy_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: ":memory:".to_string(),
            bind: "127.0.0.1:8080".to_string(),
            pool_size: 10,
            log_level: "info".to_string(),
            busy_timeout_ms: 5000,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("unknown log level `{0}`")]
    LogLevel(String),
}

/// Anything that stops the server from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("could not open the database: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
    #[error("could not run migrations: {0}")]
    Migrations(Box<dyn std::error::Error + Send + Sync>),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Reads `path` if given (defaults otherwise), then applies
    /// `DATABASE_URL`, `BIND_ADDRESS` and `LOG_LEVEL` from the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| {
                    ConfigError::Read {
                        path: path.to_path_buf(),
                        source,
                    }
                })?;
                Self::from_toml(&text)?
            }
            None => Self::default(),
        };

        config.apply_env(|key| std::env::var(key).ok());

        Ok(config)
    }

    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(url) = var("DATABASE_URL") {
            self.database_url = url;
        }
        if let Some(bind) = var("BIND_ADDRESS") {
            self.bind = bind;
        }
        if let Some(level) = var("LOG_LEVEL") {
            self.log_level = level;
        }
    }

    pub fn log_level(&self) -> Result<tracing::Level, ConfigError> {
        self.log_level
            .parse()
            .map_err(|_| ConfigError::LogLevel(self.log_level.clone()))
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    pub fn build_pool(&self) -> Result<DbPool, diesel::r2d2::PoolError> {
        build_pool(
            &self.database_url,
            self.pool_size,
            ConnectionOptions {
                busy_timeout: self.busy_timeout(),
            },
        )
    }
}

pub fn run_migrations(pool: &DbPool) -> Result<(), StartupError> {
    let mut conn = pool.get()?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(StartupError::Migrations)?;
    tracing::info!("applied {} migration(s)", applied.len());
    Ok(())
}

pub fn create_app(pool: DbPool) -> Router {
    let directory = Arc::new(SqliteDirectory::new(pool.clone()));
    let repository = Arc::new(SqliteApplicationRepository::new(pool));

    let applications = Arc::new(ApplicationService::new(
        directory.clone(),
        directory,
        repository,
    ));

    routes::router()
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { applications })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_take_defaults() {
        let config = Config::from_toml(
            r#"
            database_url = "sportspace.db"
            pool_size = 4
            "#,
        )
        .unwrap();

        assert_eq!(config.database_url, "sportspace.db");
        assert_eq!(config.pool_size, 4);
        assert_eq!(config.bind, "127.0.0.1:8080");
        assert_eq!(config.busy_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(
            Config::from_toml("databse_url = \"x\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn environment_overrides_file() {
        let mut config = Config::default();
        config.apply_env(|key| match key {
            "DATABASE_URL" => Some("prod.db".to_string()),
            "LOG_LEVEL" => Some("debug".to_string()),
            _ => None,
        });

        assert_eq!(config.database_url, "prod.db");
        assert_eq!(config.bind, "127.0.0.1:8080");
        assert_eq!(config.log_level().unwrap(), tracing::Level::DEBUG);
    }

    #[test]
    fn bad_log_level() {
        let config = Config {
            log_level: "loud".to_string(),
            ..Config::default()
        };
        assert!(matches!(config.log_level(), Err(ConfigError::LogLevel(_))));
    }
}
