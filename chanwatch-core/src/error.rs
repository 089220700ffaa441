use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Board API error: {0}")]
    ChanApi(#[from] ChanApiError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Output error: {0}")]
    Output(#[from] OutputError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

#[derive(Error, Debug, Clone)]
pub enum ChanApiError {
    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Board has no archive: {board}")]
    ArchiveUnavailable { board: String },

    #[error("Request timeout")]
    RequestTimeout,

    #[error("Invalid API response: {details}")]
    InvalidResponse { details: String },

    #[error("Server error: {status_code}")]
    ServerError { status_code: u16 },

    #[error("Unexpected status {status_code} for {endpoint}")]
    UnexpectedStatus { status_code: u16, endpoint: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Configuration parsing error: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Could not create output directory: {path}")]
    DirectoryCreation { path: String },

    #[error("Could not write report file: {path}")]
    WriteFailed { path: String },
}
