use std::path::PathBuf;

/// Failure to obtain or decode source text.
///
/// Callers on the dashboard path never see this; `loader::acquire_file`
/// logs it and reports the dataset as unavailable.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// A column mapping that can't describe a valid row.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("minimum column count must be at least 1")]
    ZeroMinimum,
    #[error("{field} maps to column {index}, beyond the {min_columns}-column minimum")]
    OutOfRange {
        field: &'static str,
        index: usize,
        min_columns: usize,
    },
    #[error("column {index} is mapped by both {first} and {second}")]
    Collision {
        index: usize,
        first: &'static str,
        second: &'static str,
    },
    #[error("{field} has no source columns")]
    Empty { field: &'static str },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be a whole number, got '{value}'")]
    InvalidNumber { name: &'static str, value: String },
}

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("invalid log level/filter '{value}': unable to build EnvFilter")]
    EnvFilter {
        value: String,
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },
    #[error("telemetry error: {0}")]
    Subscriber(Box<dyn std::error::Error + Send + Sync>),
}

/// Top-level error for the binary.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("load error: {0}")]
    Load(#[from] LoadError),
    #[error("invalid filter: {0}")]
    Filter(String),
    #[error("export failed: {0}")]
    Export(Box<dyn std::error::Error>),
}
