use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadError {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("Invalid environment override {var}: {message}")]
    InvalidEnvOverride { var: String, message: String },

    #[error("Invalid configuration: {0}")]
    Validation(String),
}
