use crate::error::*;
use tracing::{error, info, warn};

pub trait ErrorExt {
    fn log_error(&self) -> &Self;
    fn log_warn(&self) -> &Self;
    /// Advisory only. The client itself never retries.
    fn is_retryable(&self) -> bool;
    fn user_friendly_message(&self) -> String;
    fn error_code(&self) -> String;
}

impl ErrorExt for ThreadsError {
    fn log_error(&self) -> &Self {
        error!("ThreadsError: {}", self);
        match self {
            ThreadsError::RemoteCallFailed { body, .. } => {
                error!("Remote error payload: {}", body);
            }
            ThreadsError::Config(e) => {
                error!("Configuration error details: {:?}", e);
            }
            _ => {}
        }
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("ThreadsError (warning): {}", self);
        self
    }

    fn is_retryable(&self) -> bool {
        match self {
            ThreadsError::RemoteCallFailed { status, .. } => *status == 429 || *status >= 500,
            ThreadsError::Transport(e) => e.is_timeout() || e.is_connect(),
            ThreadsError::Config(e) => e.is_retryable(),
            _ => false,
        }
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ThreadsError::RemoteCallFailed { status, body } => {
                match remote_error_message(body) {
                    Some(message) => format!("Threads API rejected the request: {}", message),
                    None => format!("Threads API returned status {}.", status),
                }
            }
            ThreadsError::Transport(e) if e.is_timeout() => {
                "Request to Threads timed out. Please try again.".to_string()
            }
            ThreadsError::Transport(_) => {
                "Network connection error. Please check your internet connection.".to_string()
            }
            ThreadsError::InvalidResponse { .. } => {
                "Threads API returned a response that could not be understood.".to_string()
            }
            ThreadsError::Config(e) => e.user_friendly_message(),
            ThreadsError::Serialization(_) => {
                "Failed to encode or decode data.".to_string()
            }
        }
    }

    fn error_code(&self) -> String {
        match self {
            ThreadsError::RemoteCallFailed { .. } => "REMOTE_CALL_FAILED".to_string(),
            ThreadsError::Transport(_) => "TRANSPORT".to_string(),
            ThreadsError::InvalidResponse { .. } => "INVALID_RESPONSE".to_string(),
            ThreadsError::Config(_) => "CONFIG".to_string(),
            ThreadsError::Serialization(_) => "SERIALIZATION".to_string(),
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

    fn is_retryable(&self) -> bool {
        false
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ConfigError::FileNotFound { path } => {
                format!("Configuration file '{}' not found.", path)
            }
            ConfigError::Io { path, .. } => {
                format!("Configuration file '{}' could not be read.", path)
            }
            ConfigError::MissingField { field } => {
                format!("Required configuration field '{}' is missing.", field)
            }
            ConfigError::InvalidValue { field, .. } => {
                format!("Invalid value for configuration field '{}'.", field)
            }
            ConfigError::MissingEnvironmentVariable { var_name } => format!(
                "Environment variable '{}' is required but not set.",
                var_name
            ),
            ConfigError::Parse(_) => {
                "Configuration file format is invalid. Please check the settings.".to_string()
            }
        }
    }

    fn error_code(&self) -> String {
        match self {
            ConfigError::FileNotFound { .. } => "CONFIG_FILE_NOT_FOUND".to_string(),
            ConfigError::Io { .. } => "CONFIG_IO".to_string(),
            ConfigError::MissingField { .. } => "CONFIG_MISSING_FIELD".to_string(),
            ConfigError::InvalidValue { .. } => "CONFIG_INVALID_VALUE".to_string(),
            ConfigError::MissingEnvironmentVariable { .. } => "CONFIG_MISSING_ENV_VAR".to_string(),
            ConfigError::Parse(_) => "CONFIG_PARSE_ERROR".to_string(),
        }
    }
}

// Graph API errors look like {"error": {"message": "...", "type": "...", "code": 190}}
fn remote_error_message(body: &serde_json::Value) -> Option<&str> {
    body.get("error")
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
}

pub struct ErrorReporter {
    report_errors: bool,
    report_warnings: bool,
}

impl ErrorReporter {
    pub fn new() -> Self {
        Self {
            report_errors: true,
            report_warnings: true,
        }
    }

    pub fn with_error_reporting(mut self, enabled: bool) -> Self {
        self.report_errors = enabled;
        self
    }

    pub fn with_warning_reporting(mut self, enabled: bool) -> Self {
        self.report_warnings = enabled;
        self
    }

    pub fn report_error(&self, error: &ThreadsError) {
        if self.report_errors {
            error.log_error();
            info!("Error code: {}", error.error_code());
            info!("User message: {}", error.user_friendly_message());
            if error.is_retryable() {
                info!("Error is transient; the caller may retry");
            }
        }
    }

    pub fn report_warning(&self, error: &ThreadsError) {
        if self.report_warnings {
            error.log_warn();
        }
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new()
    }
}
