use std::{env, num::NonZeroUsize};

pub const WORKERS_VAR: &str = "OPENSPLIT_WORKERS";
pub const SHOW_POSITIONS_VAR: &str = "OPENSPLIT_SHOW_POSITIONS";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be a positive integer, got '{value}'")]
    InvalidWorkers { name: &'static str, value: String },
    #[error("{name} must be 'true' or 'false', got '{value}'")]
    InvalidFlag { name: &'static str, value: String },
}

/// Runtime settings of the interpreter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpreterConfig {
    pub workers: NonZeroUsize,
    pub show_positions: bool,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            workers: NonZeroUsize::MIN,
            show_positions: true,
        }
    }
}

impl InterpreterConfig {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup(WORKERS_VAR) {
            config.workers = value.trim().parse().map_err(|_| ConfigError::InvalidWorkers {
                name: WORKERS_VAR,
                value: value.clone(),
            })?;
        }

        if let Some(value) = lookup(SHOW_POSITIONS_VAR) {
            config.show_positions = match value.trim().to_ascii_lowercase().as_str() {
                "true" => true,
                "false" => false,
                _ => {
                    return Err(ConfigError::InvalidFlag {
                        name: SHOW_POSITIONS_VAR,
                        value,
                    });
                }
            };
        }

        Ok(config)
    }
}
