//! Environment-driven configuration for the agroyield server.
//!
//! Settings are read once at startup (after `dotenvy::dotenv()` in the
//! server binary) and every variable has a default, so a bare environment
//! still boots:
//!
//! | Variable          | Default                      |
//! |-------------------|------------------------------|
//! | `AGRO_MODEL_PATH` | `model/crop_production.json` |
//! | `AGRO_HOST`       | `0.0.0.0`                    |
//! | `AGRO_PORT`       | `8000`                       |

use std::env;
use std::path::PathBuf;

/// Default artifact location relative to the working directory.
pub const DEFAULT_MODEL_PATH: &str = "model/crop_production.json";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;

/// Errors that can occur while reading configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// A variable was set to a value that does not parse.
    #[error("Invalid value '{value}' for {var}: {message}")]
    Invalid {
        var: String,
        value: String,
        message: String,
    },
}

impl ConfigError {
    fn invalid(var: &str, value: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            var: var.to_string(),
            value: value.into(),
            message: message.into(),
        }
    }
}

/// Server settings resolved from the environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Path to the serialized model artifact.
    pub model_path: PathBuf,
    /// Host to bind the listener on.
    pub host: String,
    /// Port to bind the listener on.
    pub port: u16,
}

impl ServerConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Reads configuration through an arbitrary variable lookup.
    ///
    /// `from_env` delegates here; tests pass a closure over a map instead of
    /// mutating process-global environment state.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let model_path = lookup("AGRO_MODEL_PATH")
            .unwrap_or_else(|| DEFAULT_MODEL_PATH.to_string())
            .into();

        let host = lookup("AGRO_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match lookup("AGRO_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|e| ConfigError::invalid("AGRO_PORT", raw.clone(), e.to_string()))?,
            None => DEFAULT_PORT,
        };

        Ok(Self { model_path, host, port })
    }

    /// The socket address string to bind, e.g. `0.0.0.0:8000`.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
