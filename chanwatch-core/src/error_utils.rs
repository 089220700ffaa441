use crate::error::*;
use tracing::{error, warn};

pub trait ErrorExt {
    fn log_error(&self) -> &Self;
    fn log_warn(&self) -> &Self;
    fn user_friendly_message(&self) -> String;
    fn error_code(&self) -> String;
}

impl ErrorExt for CoreError {
    fn log_error(&self) -> &Self {
        error!("CoreError: {}", self);
        match self {
            CoreError::ChanApi(e) => {
                error!("Board API error details: {:?}", e);
            }
            CoreError::Config(e) => {
                error!("Configuration error details: {:?}", e);
            }
            CoreError::Output(e) => {
                error!("Output error details: {:?}", e);
            }
            _ => {}
        }
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("CoreError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            CoreError::ChanApi(e) => e.user_friendly_message(),
            CoreError::Config(e) => e.user_friendly_message(),
            CoreError::Output(e) => e.user_friendly_message(),
            CoreError::Network(_) => {
                "Network connection error. Please check your internet connection.".to_string()
            }
            CoreError::Io(e) => format!("File system error: {}", e),
            CoreError::Serialization(e) => format!("Could not serialize results: {}", e),
        }
    }

    fn error_code(&self) -> String {
        match self {
            CoreError::ChanApi(_) => "CHAN_API".to_string(),
            CoreError::Config(_) => "CONFIG".to_string(),
            CoreError::Output(_) => "OUTPUT".to_string(),
            CoreError::Io(_) => "IO".to_string(),
            CoreError::Serialization(_) => "SERIALIZATION".to_string(),
            CoreError::Network(_) => "NETWORK".to_string(),
        }
    }
}

impl ErrorExt for ChanApiError {
    fn log_error(&self) -> &Self {
        error!("ChanApiError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("ChanApiError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ChanApiError::NotFound { resource } => {
                format!("{} no longer exists. It may have been pruned or deleted.", resource)
            }
            ChanApiError::ArchiveUnavailable { board } => format!(
                "Board /{}/ has no archive. Some boards (like /b/) don't keep one.",
                board
            ),
            ChanApiError::RequestTimeout => {
                "Request to the board API timed out. Please try again.".to_string()
            }
            ChanApiError::ServerError { status_code } => format!(
                "The board API is having trouble (status {}). Please try again later.",
                status_code
            ),
            _ => "Board API error occurred. Please try again later.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            ChanApiError::NotFound { .. } => "CHAN_NOT_FOUND".to_string(),
            ChanApiError::ArchiveUnavailable { .. } => "CHAN_NO_ARCHIVE".to_string(),
            ChanApiError::RequestTimeout => "CHAN_TIMEOUT".to_string(),
            ChanApiError::InvalidResponse { .. } => "CHAN_INVALID_RESPONSE".to_string(),
            ChanApiError::ServerError { .. } => "CHAN_SERVER_ERROR".to_string(),
            ChanApiError::UnexpectedStatus { .. } => "CHAN_UNEXPECTED_STATUS".to_string(),
        }
    }
}

impl ErrorExt for ConfigError {
    fn log_error(&self) -> &Self {
        error!("ConfigError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("ConfigError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ConfigError::FileNotFound { path } => {
                format!("Configuration file not found at: {}", path)
            }
            ConfigError::MissingField { field } => {
                format!("Required configuration field '{}' is missing.", field)
            }
            ConfigError::InvalidValue { field, .. } => {
                format!("Invalid value for configuration field '{}'.", field)
            }
            ConfigError::Parse(_) => {
                "Configuration file is not valid TOML. Please check the syntax.".to_string()
            }
        }
    }

    fn error_code(&self) -> String {
        match self {
            ConfigError::FileNotFound { .. } => "CONFIG_FILE_NOT_FOUND".to_string(),
            ConfigError::MissingField { .. } => "CONFIG_MISSING_FIELD".to_string(),
            ConfigError::InvalidValue { .. } => "CONFIG_INVALID_VALUE".to_string(),
            ConfigError::Parse(_) => "CONFIG_PARSE_ERROR".to_string(),
        }
    }
}

impl ErrorExt for OutputError {
    fn log_error(&self) -> &Self {
        error!("OutputError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("OutputError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            OutputError::DirectoryCreation { path } => {
                format!("Could not create output directory '{}'.", path)
            }
            OutputError::WriteFailed { path } => {
                format!("Could not write results to '{}'.", path)
            }
        }
    }

    fn error_code(&self) -> String {
        match self {
            OutputError::DirectoryCreation { .. } => "OUTPUT_DIR_FAILED".to_string(),
            OutputError::WriteFailed { .. } => "OUTPUT_WRITE_FAILED".to_string(),
        }
    }
}
