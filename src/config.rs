use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::ExecError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub exchange: ExchangeConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeConfig {
    pub name: String,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub base_url: Option<String>,
    pub use_mock: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Config {
    /// Load configuration from config.json, falling back to defaults.
    /// Environment variables override sensitive/runtime fields either way.
    pub fn load() -> Result<Self, ExecError> {
        let config_path = Path::new("config.json");

        let mut cfg = if config_path.exists() {
            let mut file = File::open(config_path)
                .map_err(|e| ExecError::Config(format!("failed to open config file: {}", e)))?;

            let mut contents = String::new();
            file.read_to_string(&mut contents)
                .map_err(|e| ExecError::Config(format!("failed to read config file: {}", e)))?;

            serde_json::from_str::<Config>(&contents)
                .map_err(|e| ExecError::Config(format!("failed to parse config file: {}", e)))?
        } else {
            Config::default()
        };

        cfg.apply_env_overrides();
        Ok(cfg)
    }

    fn apply_env_overrides(&mut self) {
        use std::env;
        if let Ok(v) = env::var("EXCHANGE_API_KEY") {
            if !v.is_empty() {
                self.exchange.api_key = Some(v);
            }
        }
        if let Ok(v) = env::var("EXCHANGE_API_SECRET") {
            if !v.is_empty() {
                self.exchange.api_secret = Some(v);
            }
        }
        if let Ok(v) = env::var("EXCHANGE_BASE_URL") {
            if !v.is_empty() {
                self.exchange.base_url = Some(v);
            }
        }
        if let Ok(v) = env::var("USE_MOCK") {
            let lower = v.to_lowercase();
            if ["1", "true", "yes"].contains(&lower.as_str()) {
                self.exchange.use_mock = true;
            }
            if ["0", "false", "no"].contains(&lower.as_str()) {
                self.exchange.use_mock = false;
            }
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            exchange: ExchangeConfig {
                name: "Mock".to_string(),
                api_key: None,
                api_secret: None,
                base_url: None,
                use_mock: true,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}
