use crate::dashboard::DEFAULT_TABLE_LIMIT;
use crate::error::ConfigError;
use std::env;
use std::path::PathBuf;

/// Top-level configuration for the capacity tool.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Dataset loaded at startup when no file is given.
    pub data_file: PathBuf,
    /// Where exports are written.
    pub output_dir: PathBuf,
    /// Row cap for the records table; clamped by the dashboard.
    pub table_limit: usize,
    pub telemetry: TelemetryConfig,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let data_file = env::var("CAPACITY_DATA_FILE").unwrap_or_else(|_| "data.csv".to_string());
        let output_dir = env::var("CAPACITY_OUTPUT_DIR").unwrap_or_else(|_| ".".to_string());
        let table_limit = match env::var("CAPACITY_TABLE_LIMIT") {
            Ok(value) => match value.trim().parse::<usize>() {
                Ok(limit) => limit,
                Err(_) => {
                    return Err(ConfigError::InvalidNumber {
                        name: "CAPACITY_TABLE_LIMIT",
                        value,
                    })
                }
            },
            Err(_) => DEFAULT_TABLE_LIMIT,
        };
        let log_level = env::var("CAPACITY_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            data_file: PathBuf::from(data_file),
            output_dir: PathBuf::from(output_dir),
            table_limit,
            telemetry: TelemetryConfig { log_level },
        })
    }
}
