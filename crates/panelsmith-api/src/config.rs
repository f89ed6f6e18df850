//! Server configuration read from the environment.

use std::path::PathBuf;

use panelsmith_breakdown::domain::entities::Gazetteer;

use crate::error::AppError;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Runtime configuration for the API server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// `PostgreSQL` URL. Without one the server keeps episodes in memory.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub max_connections: u32,
    /// JSON file replacing the built-in gazetteer.
    pub gazetteer_path: Option<PathBuf>,
}

impl ServerConfig {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable holds an invalid value.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name to
    /// its value. Empty values count as unset.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable holds an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match var("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?,
            None => DEFAULT_PORT,
        };
        let max_connections = match var("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(AppError::Config(format!(
                        "DATABASE_MAX_CONNECTIONS must be a positive integer, got {raw:?}"
                    )));
                }
            },
            None => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| DEFAULT_HOST.to_owned()),
            port,
            database_url: var("DATABASE_URL"),
            max_connections,
            gazetteer_path: var("GAZETTEER_PATH").map(PathBuf::from),
        })
    }

    /// Loads the configured gazetteer, or the built-in one when no path is set.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or parsed.
    pub async fn load_gazetteer(&self) -> Result<Gazetteer, AppError> {
        let Some(path) = &self.gazetteer_path else {
            return Ok(Gazetteer::default());
        };
        let json = tokio::fs::read_to_string(path).await.map_err(|e| {
            AppError::Config(format!("cannot read gazetteer {}: {e}", path.display()))
        })?;
        Gazetteer::from_json(&json)
            .map_err(|e| AppError::Config(format!("{}: {e}", path.display())))
    }
}
